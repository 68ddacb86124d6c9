// src/schema/table.rs

use super::types::{Column, ColumnType::*, Rule as R};

/// Schema revision; bump when a column's name, type or rule changes so old
/// cache files can be told apart.
pub const SCHEMA_VERSION: u32 = 1;

/// Number of fields kept from each source line.
pub const RAW_FIELDS: usize = 64;

/// Number of dataset columns: the region code plus the raw fields.
pub const COLUMN_COUNT: usize = RAW_FIELDS + 1;

pub const REGION_COLUMN: usize = 0;
pub const ID_COLUMN: usize = 1;
pub const DATE_COLUMN: usize = 4;
pub const TIME_COLUMN: usize = 6;

#[rustfmt::skip]
pub static COLUMNS: [Column; COLUMN_COUNT] = [
    Column::new("Kraj",                                      Text { width: 3 },  R::Region),
    Column::new("ID nehody",                                 Text { width: 14 }, R::StripQuotes),
    Column::new("Typ cesty",                                 Int8,               R::DefaultInt),
    Column::new("Číslo cesty",                               Int32,              R::DefaultInt),
    Column::new("Datum nehody",                              Date,               R::Date),
    Column::new("Den v týdnu",                               Int8,               R::DefaultInt),
    Column::new("Čas nehody",                                Time,               R::Time),
    Column::new("Druh nehody",                               Int8,               R::DefaultInt),
    Column::new("Druh srážky",                               Int8,               R::DefaultInt),
    Column::new("Druh překážky",                             Int8,               R::DefaultInt),
    Column::new("Charakter nehody",                          Int8,               R::DefaultInt),
    Column::new("Zavinění nehody",                           Int8,               R::DefaultInt),
    Column::new("Alkohol přítomen",                          Int8,               R::DefaultInt),
    Column::new("Hlavní příčina nehody",                     Int16,              R::DefaultInt),
    Column::new("Usmrceno osob",                             Int8,               R::DefaultInt),
    Column::new("Těžce zraněno osob",                        Int8,               R::DefaultInt),
    Column::new("Lehce zraněno osob",                        Int8,               R::DefaultInt),
    Column::new("Celková hmotná škoda",                      Int32,              R::DefaultInt),
    Column::new("Typ povrchu",                               Int8,               R::DefaultInt),
    Column::new("Stav povrchu v době nehody",                Int8,               R::DefaultInt),
    Column::new("Stav komunikace",                           Int8,               R::DefaultInt),
    Column::new("Povětrnostní podmínky",                     Int8,               R::DefaultInt),
    Column::new("Viditelnost",                               Int8,               R::DefaultInt),
    Column::new("Rozhledové poměry",                         Int8,               R::DefaultInt),
    Column::new("Dělení komunikace",                         Int8,               R::DefaultInt),
    Column::new("Situování nehody na komunikaci",            Int8,               R::DefaultInt),
    Column::new("Řízení provozu v době nehody",              Int8,               R::DefaultInt),
    Column::new("Místní úprava přednosti v jízdě",           Int8,               R::DefaultInt),
    Column::new("Specifická místa a objekty v místě nehody", Int8,               R::DefaultInt),
    Column::new("Směrové poměry",                            Int8,               R::DefaultInt),
    Column::new("Počet zúčastněných vozidel",                Int8,               R::DefaultInt),
    Column::new("Místo dopravní nehody",                     Int8,               R::DefaultInt),
    Column::new("Druh křižující komunikace",                 Int8,               R::DefaultInt),
    Column::new("Druh vozidla",                              Int8,               R::DefaultInt),
    Column::new("Značka vozidla",                            Int8,               R::DefaultInt),
    Column::new("Rok výroby",                                Text { width: 2 },  R::StripQuotes),
    Column::new("Charakteristika vozidla",                   Int8,               R::DefaultInt),
    Column::new("Smyk",                                      Int8,               R::DefaultInt),
    Column::new("Vozidlo po nehodě",                         Int8,               R::DefaultInt),
    Column::new("Únik provozních, přepravních hmot",         Int8,               R::DefaultInt),
    Column::new("Způsob vyprostění osob z vozidla",          Int8,               R::DefaultInt),
    Column::new("Směr jízdy nebo postavení vozidla",         Int8,               R::DefaultInt),
    Column::new("Škoda na vozidle (stovky kč)",              Int32,              R::DefaultInt),
    Column::new("Kategorie řidiče",                          Int8,               R::DefaultInt),
    Column::new("Vnější ovlivnění řidiče",                   Int8,               R::DefaultInt),
    Column::new("a",                                         Int8,               R::DefaultInt),
    Column::new("b",                                         Float32,            R::DefaultFloat),
    Column::new("c",                                         Float32,            R::DefaultFloat),
    Column::new("GPS souřadnice X",                          Float32,            R::DefaultFloat),
    Column::new("GPS souřadnice Y",                          Float32,            R::DefaultFloat),
    Column::new("f",                                         Float32,            R::DefaultFloat),
    Column::new("g",                                         Float32,            R::DefaultFloat),
    Column::new("Obec",                                      Text { width: 30 }, R::StripQuotes),
    Column::new("Ulice",                                     Text { width: 30 }, R::StripQuotes),
    Column::new("j",                                         Text { width: 30 }, R::StripQuotes),
    Column::new("Typ komunikace",                            Text { width: 30 }, R::StripQuotes),
    Column::new("Jméno komunikace",                          Text { width: 30 }, R::StripQuotes),
    Column::new("n",                                         Text { width: 10 }, R::StripQuotes),
    Column::new("o",                                         Text { width: 30 }, R::StripQuotes),
    Column::new("Směr nehody",                               Text { width: 30 }, R::StripQuotes),
    Column::new("Provoz v době nehody",                      Text { width: 15 }, R::StripQuotes),
    Column::new("r",                                         Text { width: 15 }, R::StripQuotes),
    Column::new("s",                                         Text { width: 15 }, R::Verbatim),
    Column::new("t",                                         Text { width: 30 }, R::Verbatim),
    Column::new("Lokalita nehody",                           Text { width: 30 }, R::StripQuotes),
];

/// Ordered column names of the dataset.
pub fn header() -> Vec<String> {
    COLUMNS.iter().map(|c| c.name.to_string()).collect()
}

/// Index of the column called `name`.
pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ColumnType, Rule};

    #[test]
    fn default_int_columns_match_layout() {
        let expected: Vec<usize> = [2, 3, 5]
            .into_iter()
            .chain(7..=34)
            .chain(36..=45)
            .collect();
        let actual: Vec<usize> = COLUMNS
            .iter()
            .enumerate()
            .filter(|(_, c)| c.rule == Rule::DefaultInt)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn float_columns_are_46_to_51() {
        let floats: Vec<usize> = COLUMNS
            .iter()
            .enumerate()
            .filter(|(_, c)| c.rule == Rule::DefaultFloat)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(floats, (46..=51).collect::<Vec<_>>());
        assert!(floats.iter().all(|&i| COLUMNS[i].ty == ColumnType::Float32));
    }

    #[test]
    fn well_known_positions() {
        assert_eq!(COLUMNS[REGION_COLUMN].rule, Rule::Region);
        assert_eq!(COLUMNS[DATE_COLUMN].ty, ColumnType::Date);
        assert_eq!(COLUMNS[TIME_COLUMN].ty, ColumnType::Time);
        assert_eq!(column_index("Usmrceno osob"), Some(14));
        assert_eq!(header().len(), COLUMN_COUNT);
    }
}
