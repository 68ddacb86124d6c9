use crate::error::{Error, Result};
use std::{fmt, str::FromStr};

/// The fourteen regions covered by the accident exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Pha,
    Stc,
    Jhc,
    Plk,
    Ulk,
    Hkk,
    Jhm,
    Msk,
    Olk,
    Zlk,
    Vys,
    Pak,
    Lbk,
    Kvk,
}

impl Region {
    pub const ALL: [Region; 14] = [
        Region::Pha,
        Region::Stc,
        Region::Jhc,
        Region::Plk,
        Region::Ulk,
        Region::Hkk,
        Region::Jhm,
        Region::Msk,
        Region::Olk,
        Region::Zlk,
        Region::Vys,
        Region::Pak,
        Region::Lbk,
        Region::Kvk,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Region::Pha => "PHA",
            Region::Stc => "STC",
            Region::Jhc => "JHC",
            Region::Plk => "PLK",
            Region::Ulk => "ULK",
            Region::Hkk => "HKK",
            Region::Jhm => "JHM",
            Region::Msk => "MSK",
            Region::Olk => "OLK",
            Region::Zlk => "ZLK",
            Region::Vys => "VYS",
            Region::Pak => "PAK",
            Region::Lbk => "LBK",
            Region::Kvk => "KVK",
        }
    }

    /// Name of the region's file inside every yearly archive.
    pub fn file_name(&self) -> &'static str {
        match self {
            Region::Pha => "00.csv",
            Region::Stc => "01.csv",
            Region::Jhc => "02.csv",
            Region::Plk => "03.csv",
            Region::Ulk => "04.csv",
            Region::Hkk => "05.csv",
            Region::Jhm => "06.csv",
            Region::Msk => "07.csv",
            Region::Olk => "14.csv",
            Region::Zlk => "15.csv",
            Region::Vys => "16.csv",
            Region::Pak => "17.csv",
            Region::Lbk => "18.csv",
            Region::Kvk => "19.csv",
        }
    }

    /// Resolve a list of codes, failing on the first unknown one.
    pub fn parse_all<S: AsRef<str>>(codes: &[S]) -> Result<Vec<Region>> {
        codes.iter().map(|c| c.as_ref().parse()).collect()
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.code() == s)
            .ok_or_else(|| Error::UnknownRegion {
                code: s.to_string(),
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codes_round_trip() {
        for region in Region::ALL {
            assert_eq!(region.code().parse::<Region>().unwrap(), region);
        }
    }

    #[test]
    fn file_names_are_distinct() {
        let names: HashSet<_> = Region::ALL.iter().map(|r| r.file_name()).collect();
        assert_eq!(names.len(), Region::ALL.len());
        assert_eq!(Region::Msk.file_name(), "07.csv");
        assert_eq!(Region::Kvk.file_name(), "19.csv");
    }

    #[test]
    fn unknown_code_fails_lookup() {
        let err = Region::parse_all(&["MSK", "XYZ"]).unwrap_err();
        match err {
            Error::UnknownRegion { code } => assert_eq!(code, "XYZ"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
