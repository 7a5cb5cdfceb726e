//! Package directories and command builders.
//!
//! A [`PackageContext`] is what a recipe sees once a configuration has been
//! attached: the configuration itself and the directories derived for the
//! package. Its builders only produce command strings; nothing here touches
//! the filesystem.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::BuildConfig;

use super::{CmdList, Layout};

/// Directories of one configured package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDirs {
  /// `<install_root>/<name>`
  pub base_dir: PathBuf,
  /// `<base_dir>/<version>`
  pub version_dir: PathBuf,
  /// `<version_dir>/src`, shared by every configuration.
  pub source_dir: PathBuf,
  pub build_dir: PathBuf,
  pub install_dir: PathBuf,
  /// `<version_dir>/step_stamp.json`
  pub stamp_path: PathBuf,
  /// Scratch script each step is written to before it runs.
  pub script_path: PathBuf,
}

impl PackageDirs {
  /// Derive the directories of `name`/`version` under `config`.
  pub fn derive(name: &str, version: &str, layout: Layout, config: &BuildConfig) -> Self {
    let base_dir = config.install_root.join(name);
    let version_dir = base_dir.join(version);
    let source_dir = version_dir.join("src");
    let stamp_path = version_dir.join("step_stamp.json");
    let build_base = config.build_root.join(name).join(version);

    let (install_dir, build_dir, script_path) = match layout {
      Layout::PerBuildFlag => {
        let build_dir = build_base.join(&config.build_flag);
        let script_path = build_dir.join(format!("tmp-{}.sh", config.build_flag));
        (version_dir.join(&config.build_flag), build_dir, script_path)
      }
      Layout::Shared => {
        let script_path = build_base.join("tmp.sh");
        (version_dir.join("install"), build_base, script_path)
      }
    };

    Self {
      base_dir,
      version_dir,
      source_dir,
      build_dir,
      install_dir,
      stamp_path,
      script_path,
    }
  }

  /// Directories created before the first step runs.
  pub fn to_create(&self) -> [&Path; 5] {
    [
      self.base_dir.as_path(),
      self.version_dir.as_path(),
      self.source_dir.as_path(),
      self.build_dir.as_path(),
      self.install_dir.as_path(),
    ]
  }
}

/// Configuration plus derived directories, handed to recipes.
#[derive(Debug, Clone)]
pub struct PackageContext<'a> {
  pub config: &'a BuildConfig,
  pub dirs: PackageDirs,
}

impl<'a> PackageContext<'a> {
  pub fn new(name: &str, version: &str, layout: Layout, config: &'a BuildConfig) -> Self {
    let dirs = PackageDirs::derive(name, version, layout, config);

    debug!(package = %name, version = %version, "base directory: {}", dirs.base_dir.display());
    debug!(package = %name, version = %version, "source directory: {}", dirs.source_dir.display());
    debug!(package = %name, version = %version, "build directory: {}", dirs.build_dir.display());
    debug!(package = %name, version = %version, "install directory: {}", dirs.install_dir.display());
    debug!(package = %name, version = %version, "stamp file: {}", dirs.stamp_path.display());

    Self { config, dirs }
  }

  pub fn source_dir(&self) -> &Path {
    &self.dirs.source_dir
  }

  pub fn build_dir(&self) -> &Path {
    &self.dirs.build_dir
  }

  pub fn install_dir(&self) -> &Path {
    &self.dirs.install_dir
  }

  /// Default download location of `url`: `<build_dir>/<file name>`.
  pub fn download_path(&self, url: &str) -> PathBuf {
    self.dirs.build_dir.join(url_file_name(url))
  }

  /// Clone `repo_url` into the source directory and check out `tag`.
  pub fn clone_git_repo(&self, repo_url: &str, tag: &str, remove_exist: bool) -> CmdList {
    let src = self.dirs.source_dir.display();
    let mut cmds = Vec::new();

    if remove_exist {
      cmds.extend([
        format!("if [ -d {} ]; then", src),
        format!("    rm -rvf {}", src),
        "fi".to_string(),
      ]);
    }

    cmds.extend([
      format!("git clone {} {}", repo_url, src),
      format!("cd {}", src),
      format!("git checkout {}", tag),
      "cd -".to_string(),
    ]);
    cmds
  }

  /// Download `url` to `dest`, or to [`Self::download_path`] when `None`.
  pub fn download_file(&self, url: &str, dest: Option<&Path>, remove_exist: bool) -> CmdList {
    let file = dest.map_or_else(|| self.download_path(url), Path::to_path_buf);
    let file = file.display();
    let mut cmds = Vec::new();

    if remove_exist {
      cmds.extend([
        format!("if [ -e {} ]; then", file),
        format!("    rm -rvf {}", file),
        "fi".to_string(),
      ]);
    }

    cmds.push(format!("wget {} -O {}", url, file));
    cmds
  }

  /// Extract `archive` into `dest` (the source directory when `None`).
  pub fn extract_archive(&self, archive: &Path, dest: Option<&Path>, strip_components: u32) -> CmdList {
    let dest = dest.unwrap_or(self.dirs.source_dir.as_path());
    vec![format!(
      "tar -xvf {} -C {} --strip-components={}",
      archive.display(),
      dest.display(),
      strip_components
    )]
  }

  pub fn extract_archive_to_source(&self, archive: &Path, strip_components: u32) -> CmdList {
    self.extract_archive(archive, None, strip_components)
  }

  /// Apply `patch_file` (relative to the patch directory) unless it is
  /// already applied: a dry run decides whether the real run happens.
  pub fn apply_patch(&self, patch_file: impl AsRef<Path>) -> CmdList {
    let patch = self.config.patch_path(patch_file);
    let patch = patch.display();

    vec![
      format!("cd {}", self.dirs.source_dir.display()),
      format!("if patch -p1 -N --dry-run -i {} > /dev/null; then", patch),
      format!("    patch -p1 -N -i {}", patch),
      "fi".to_string(),
      "cd -".to_string(),
    ]
  }

  /// CMake configure invocation.
  ///
  /// `CMAKE_BUILD_TYPE` and `CMAKE_INSTALL_PREFIX` default to the configured
  /// build type and the install directory unless present in `args`.
  pub fn cmake_config<K, V>(&self, args: &[(K, V)]) -> CmdList
  where
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut cmd = format!(
      "cmake -B {} -S {}",
      self.dirs.build_dir.display(),
      self.dirs.source_dir.display()
    );

    for (key, value) in args {
      cmd.push_str(&format!(" -D{}={}", key.as_ref(), value.as_ref()));
    }

    let has = |name: &str| args.iter().any(|(k, _)| k.as_ref() == name);
    if !has("CMAKE_BUILD_TYPE") {
      cmd.push_str(&format!(" -DCMAKE_BUILD_TYPE={}", self.config.build_type));
    }
    if !has("CMAKE_INSTALL_PREFIX") {
      cmd.push_str(&format!(" -DCMAKE_INSTALL_PREFIX={}", self.dirs.install_dir.display()));
    }

    vec![cmd]
  }

  /// CMake build invocation for `target` using the configured job count.
  pub fn cmake_build(&self, target: &str) -> CmdList {
    vec![format!(
      "cmake --build {} --target {} -- -j{}",
      self.dirs.build_dir.display(),
      target,
      self.config.job_count
    )]
  }
}

/// Last non-empty path segment of a URL.
fn url_file_name(url: &str) -> &str {
  url.rsplit('/').find(|s| !s.is_empty()).unwrap_or("download")
}
