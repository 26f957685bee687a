//! Structured views over the colon-delimited account databases.
//!
//! Records keep every field as the raw text found on disk so that a record
//! which is not edited renders back byte-identical. Only the GID field is ever
//! rewritten, and only through `set_gid`/`set_primary_gid`.

/// Parse a GID as written in an account database or on the command line.
///
/// Accepts only plain ASCII digits (no sign, no whitespace) and rejects the
/// `(gid_t)-1` sentinel.
#[must_use]
pub fn parse_gid(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(u32::MAX) | Err(_) => None,
        Ok(g) => Some(g),
    }
}

/// A line type of a colon-delimited account database.
pub trait Record: Sized {
    /// Parse one line; `None` when the line is not a well-formed record.
    fn parse(line: &str) -> Option<Self>;
    fn render(&self) -> String;
}

/// One `name:password:gid:members` line of the group database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRecord {
    pub name: String,
    pub password: String,
    gid: String,
    members: String,
}

impl GroupRecord {
    /// Current GID, when the field holds a valid one.
    #[must_use]
    pub fn gid(&self) -> Option<u32> {
        parse_gid(&self.gid)
    }

    /// The GID field exactly as stored.
    #[must_use]
    pub fn gid_raw(&self) -> &str {
        &self.gid
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.split(',').filter(|m| !m.is_empty())
    }

    pub fn set_gid(&mut self, gid: u32) {
        self.gid = gid.to_string();
    }
}

impl Record for GroupRecord {
    fn parse(line: &str) -> Option<Self> {
        if line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split(':').collect();
        let [name, password, gid, members] = fields.as_slice() else {
            return None;
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: (*name).to_string(),
            password: (*password).to_string(),
            gid: (*gid).to_string(),
            members: (*members).to_string(),
        })
    }

    fn render(&self) -> String {
        format!("{}:{}:{}:{}", self.name, self.password, self.gid, self.members)
    }
}

/// One `name:password:uid:gid:gecos:home:shell` line of the user database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    fields: Vec<String>,
}

impl UserRecord {
    const PRIMARY_GID: usize = 3;

    #[must_use]
    pub fn primary_gid(&self) -> Option<u32> {
        self.fields.get(Self::PRIMARY_GID).and_then(|g| parse_gid(g))
    }

    pub fn set_primary_gid(&mut self, gid: u32) {
        if let Some(f) = self.fields.get_mut(Self::PRIMARY_GID) {
            *f = gid.to_string();
        }
    }
}

impl Record for UserRecord {
    fn parse(line: &str) -> Option<Self> {
        if line.starts_with('#') {
            return None;
        }
        let fields: Vec<String> = line.split(':').map(str::to_string).collect();
        if fields.len() != 7 || fields[0].is_empty() {
            return None;
        }
        Some(Self {
            name: fields[0].clone(),
            fields,
        })
    }

    fn render(&self) -> String {
        self.fields.join(":")
    }
}

/// A database line: either a parsed record or text carried through untouched
/// (comments, blank lines, NIS `+`/`-` entries that fail to parse, garbage).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DbLine<R> {
    Record(R),
    Verbatim(String),
}

/// A whole account database file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountFile<R> {
    lines: Vec<DbLine<R>>,
    trailing_newline: bool,
}

pub type GroupDb = AccountFile<GroupRecord>;
pub type PasswdDb = AccountFile<UserRecord>;

impl<R: Record> AccountFile<R> {
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = if trailing_newline {
            &text[..text.len() - 1]
        } else {
            text
        };
        let lines = if text.is_empty() {
            Vec::new()
        } else {
            body.split('\n')
                .map(|l| match R::parse(l) {
                    Some(r) if r.render() == l => DbLine::Record(r),
                    _ => DbLine::Verbatim(l.to_string()),
                })
                .collect()
        };
        Self {
            lines,
            trailing_newline,
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self
            .lines
            .iter()
            .map(|l| match l {
                DbLine::Record(r) => r.render(),
                DbLine::Verbatim(s) => s.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        if self.trailing_newline {
            out.push('\n');
        }
        out
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.lines.iter().filter_map(|l| match l {
            DbLine::Record(r) => Some(r),
            DbLine::Verbatim(_) => None,
        })
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut R> {
        self.lines.iter_mut().filter_map(|l| match l {
            DbLine::Record(r) => Some(r),
            DbLine::Verbatim(_) => None,
        })
    }
}

impl GroupDb {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&GroupRecord> {
        self.records().find(|r| r.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut GroupRecord> {
        self.records_mut().find(|r| r.name == name)
    }

    /// Names of every group whose GID field equals `gid`.
    #[must_use]
    pub fn holders_of(&self, gid: u32) -> Vec<&str> {
        self.records()
            .filter(|r| r.gid() == Some(gid))
            .map(|r| r.name.as_str())
            .collect()
    }
}

impl PasswdDb {
    /// Rewrite the primary GID of every user whose primary GID is exactly `source`.
    /// Returns the names of the users touched.
    pub fn retarget_primary(&mut self, source: u32, target: u32) -> Vec<String> {
        let mut touched = Vec::new();
        for u in self.records_mut() {
            if u.primary_gid() == Some(source) {
                u.set_primary_gid(target);
                touched.push(u.name.clone());
            }
        }
        touched
    }
}
