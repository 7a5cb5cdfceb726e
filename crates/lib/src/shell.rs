//! Shell dialects for environment setup commands.
//!
//! Setup commands are emitted for a POSIX shell and for the csh family.
//! Both append to PATH-like variables without clobbering an existing value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::package::CmdList;

/// Supported setup-script dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellDialect {
  Sh,
  Csh,
}

impl ShellDialect {
  pub const ALL: [ShellDialect; 2] = [ShellDialect::Sh, ShellDialect::Csh];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Sh => "sh",
      Self::Csh => "csh",
    }
  }

  /// File extension of a setup script in this dialect.
  pub fn script_extension(&self) -> &'static str {
    self.as_str()
  }

  pub fn comment(&self, text: &str) -> String {
    format!("# {}", text)
  }

  /// Commands prepending each value to its variable.
  ///
  /// An unset variable is initialised to the value alone so no dangling
  /// separator ends up in the search path.
  pub fn append_envvar<K, V>(&self, pairs: &[(K, V)]) -> CmdList
  where
    K: AsRef<str>,
    V: AsRef<str>,
  {
    let mut cmds = Vec::with_capacity(pairs.len() * 6);

    for (key, value) in pairs {
      let (k, v) = (key.as_ref(), value.as_ref());
      match self {
        Self::Sh => cmds.extend([
          format!("if [ -z \"${}\" ]; then", k),
          format!("    export {}=\"{}\"", k, v),
          "else".to_string(),
          format!("    export {}=\"{}:${}\"", k, v, k),
          "fi".to_string(),
          String::new(),
        ]),
        Self::Csh => cmds.extend([
          format!("if ( $?{} ) then", k),
          format!("    setenv {} \"{}:${}\"", k, v, k),
          "else".to_string(),
          format!("    setenv {} \"{}\"", k, v),
          "endif".to_string(),
          String::new(),
        ]),
      }
    }

    cmds
  }
}

impl fmt::Display for ShellDialect {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
