#![allow(dead_code)]

use std::{fs, path::Path};

use oradiag::OracleHome;
use tempfile::TempDir;

pub const FACILITY_LIS: &str = "\
# facility.lis - facility:component:legacy name:description
ora:rdbms:*:Oracle RDBMS
sp2:sqlplus:*:SQL*Plus

tns:network:*:Transparent Network Substrate   # listener errors
rman:rdbms:*:Recovery Manager
bad:line:only two colons
too:many:colons:in:this line
 :rdbms:*:record without a code
";

pub const ORAUS_MSG: &str = "\
/ Copyright (c) 1994, 2019, Oracle.
/
00000, 00000, \"normal, successful completion\"
// *Cause:  Normal exit.
// *Action: None.
00001, 00000, \"unique constraint (%s.%s) violated\"
// *Cause: An UPDATE or INSERT statement attempted to insert a duplicate key.
// *Action: Either remove the unique restriction or do not insert the key.
00017, 00000, \"session requested to set trace event\"
// *Cause:  The current session was requested to set a trace event by another
//          session.
/
// *Action: This is used internally; no action is required.
00018, 00000, \"maximum number of sessions exceeded\"
// *Cause:  All session state objects are in use.
00019, 00000, \"maximum number of session licenses exceeded\"
// *Action: Increase the number of session licenses.
00942, 00000, \"table or view does not exist\"
";

pub const SP2US_MSG: &str = "\
0734, 0, \"unknown command beginning \\\"%s\\\" - rest of line ignored.\"
// *Cause: The command entered was invalid.
// *Action: Check the syntax of the command you used for the correct options.
310, 0, \"unable to open file \\\"%s\\\"\"
// *Cause: The file does not exist.
// *Action: Check that the file exists.
";

/// An installation tree with a facility catalog and message files for the
/// `ora` and `sp2` facilities. `tns` is in the catalog but has no message file.
pub struct Fixture {
    pub dir: TempDir,
    pub home: OracleHome,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = OracleHome::new(dir.path());
        write(&home.facility_catalog_path(), FACILITY_LIS);
        write(&home.message_file_path("rdbms", "ora"), ORAUS_MSG);
        write(&home.message_file_path("sqlplus", "sp2"), SP2US_MSG);
        Self { dir, home }
    }

    /// An installation root with no catalog files at all.
    pub fn empty() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = OracleHome::new(dir.path());
        Self { dir, home }
    }

    pub fn write_catalog(&self, text: &str) {
        write(&self.home.facility_catalog_path(), text);
    }
}

pub fn write(path: &Path, text: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture directory");
    }
    fs::write(path, text).expect("failed to write fixture file");
}
