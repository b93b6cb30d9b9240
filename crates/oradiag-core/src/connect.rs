use std::{fmt, str::FromStr};

use crate::{CoreError, CoreResult};

const TNS_SEPARATOR: char = '@';
const PASSWORD_SEPARATOR: char = '/';
const SYSDBA_USER: &str = "SYS";

/// A `username/password@tnsname` connect string, any part of which may be
/// left out when parsing.
///
/// Accepted shapes are `tnsname`, `username@tnsname`, `username/password`
/// and `username/password@tnsname`. Missing credentials can be supplied
/// afterwards with [`ConnectString::with_username`] and
/// [`ConnectString::with_password`]; [`ConnectString::connect_arg`] refuses
/// to build an argument without both.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectString {
    username: String,
    password: String,
    tns_name: String,
}

impl ConnectString {
    /// User name, empty when not given.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Net service name, empty for a local connection.
    pub fn tns_name(&self) -> &str {
        &self.tns_name
    }

    /// Whether a password was given.
    pub fn has_password(&self) -> bool {
        !self.password.is_empty()
    }

    /// Replaces the user name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Replaces the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// `SYS` always connects with the `sysdba` privilege.
    pub fn is_sysdba(&self) -> bool {
        self.username.eq_ignore_ascii_case(SYSDBA_USER)
    }

    /// The argument handed to the tool: `username/password[@tnsname]`,
    /// followed by ` as sysdba` for `SYS`.
    pub fn connect_arg(&self) -> CoreResult<String> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(CoreError::IncompleteConnectString);
        }
        let mut arg = format!("{}{PASSWORD_SEPARATOR}{}", self.username, self.password);
        if !self.tns_name.is_empty() {
            arg.push(TNS_SEPARATOR);
            arg.push_str(&self.tns_name);
        }
        if self.is_sysdba() {
            arg.push_str(" as sysdba");
        }
        Ok(arg)
    }
}

impl FromStr for ConnectString {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (credentials, tns_name) = match s.split_once(TNS_SEPARATOR) {
            Some(parts) => parts,
            None if s.contains(PASSWORD_SEPARATOR) => (s, ""),
            None => ("", s),
        };
        if tns_name.contains([TNS_SEPARATOR, PASSWORD_SEPARATOR]) {
            return Err(CoreError::MalformedConnectString);
        }
        let (username, password) = credentials
            .split_once(PASSWORD_SEPARATOR)
            .unwrap_or((credentials, ""));
        if password.contains(PASSWORD_SEPARATOR) {
            return Err(CoreError::MalformedConnectString);
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            tns_name: tns_name.to_string(),
        })
    }
}

impl fmt::Debug for ConnectString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectString")
            .field("username", &self.username)
            .field("password", &if self.has_password() { "***" } else { "" })
            .field("tns_name", &self.tns_name)
            .finish()
    }
}
