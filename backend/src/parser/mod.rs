//! Passenger CSV parser with encoding and delimiter auto-detection.
//!
//! Turns a raw payload into a [`PassengerTable`]. Header names are
//! canonicalized to lower-case exactly once here; nothing downstream looks
//! at raw header text again.

use crate::error::{DataSourceError, DataSourceResult};
use crate::models::{PassengerClass, PassengerRecord, PassengerTable, Sex};
use tracing::debug;

// =============================================================================
// Columns
// =============================================================================

/// A column the parser knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    PassengerId,
    Survived,
    Pclass,
    Name,
    Sex,
    Age,
    SibSp,
    Parch,
    Ticket,
    Fare,
    Cabin,
    Embarked,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::PassengerId,
        Column::Survived,
        Column::Pclass,
        Column::Name,
        Column::Sex,
        Column::Age,
        Column::SibSp,
        Column::Parch,
        Column::Ticket,
        Column::Fare,
        Column::Cabin,
        Column::Embarked,
    ];

    /// Canonical (lower-case) column name.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Column::PassengerId => "passengerid",
            Column::Survived => "survived",
            Column::Pclass => "pclass",
            Column::Name => "name",
            Column::Sex => "sex",
            Column::Age => "age",
            Column::SibSp => "sibsp",
            Column::Parch => "parch",
            Column::Ticket => "ticket",
            Column::Fare => "fare",
            Column::Cabin => "cabin",
            Column::Embarked => "embarked",
        }
    }

    /// Match an already canonicalized header, including long-form aliases.
    pub fn from_canonical(header: &str) -> Option<Self> {
        match header {
            "passengerid" | "passenger_id" => Some(Column::PassengerId),
            "survived" => Some(Column::Survived),
            "pclass" | "passenger_class" => Some(Column::Pclass),
            "name" => Some(Column::Name),
            "sex" => Some(Column::Sex),
            "age" => Some(Column::Age),
            "sibsp" | "siblings_spouses_aboard" => Some(Column::SibSp),
            "parch" | "parents_children_aboard" => Some(Column::Parch),
            "ticket" => Some(Column::Ticket),
            "fare" => Some(Column::Fare),
            "cabin" => Some(Column::Cabin),
            "embarked" => Some(Column::Embarked),
            _ => None,
        }
    }

    /// Columns that must be present in the header.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Column::Survived
                | Column::Pclass
                | Column::Name
                | Column::Sex
                | Column::SibSp
                | Column::Parch
                | Column::Fare
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Canonicalize a raw header: strip BOM and whitespace, lower-case.
pub fn canonicalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// Position of each known column in the source header.
#[derive(Debug, Clone, Default)]
struct ColumnIndex {
    positions: [Option<usize>; 12],
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> DataSourceResult<Self> {
        let mut index = Self::default();
        for (pos, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_canonical(header) {
                // First occurrence wins
                index.positions[column.index()].get_or_insert(pos);
            }
        }

        if let Some(missing) = Column::ALL
            .iter()
            .find(|c| c.is_required() && index.positions[c.index()].is_none())
        {
            return Err(DataSourceError::MissingColumn(
                missing.canonical_name().to_string(),
            ));
        }

        Ok(index)
    }

    fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.index()]
    }

    fn recognized(&self) -> Vec<&'static str> {
        Column::ALL
            .iter()
            .filter(|c| self.positions[c.index()].is_some())
            .map(|c| c.canonical_name())
            .collect()
    }
}

// =============================================================================
// Parse Result
// =============================================================================

/// Result of parsing with metadata.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed passengers, in source order.
    pub table: PassengerTable,
    /// Detected or used encoding.
    pub encoding: String,
    /// Detected or used delimiter.
    pub delimiter: char,
    /// All header names, canonicalized.
    pub headers: Vec<String>,
    /// Canonical names of the columns that were recognized.
    pub columns: Vec<&'static str>,
}

// =============================================================================
// Encoding & Delimiter Detection
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the specified encoding.
///
/// Payloads claimed as UTF-8 that fail validation are re-read as
/// Windows-1252, which maps every byte. Unknown encodings fall back to
/// lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => {
                debug!(valid_up_to = e.valid_up_to(), "invalid UTF-8, decoding as windows-1252");
                encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
            }
        },
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse raw bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> DataSourceResult<ParseResult> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DataSourceError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_content(&content, delimiter, encoding)
}

/// Parse UTF-8 text with an auto-detected delimiter.
///
/// # Example
/// ```
/// let csv = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare\n\
///            1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25";
/// let table = titanic::parser::parse_str(csv).unwrap();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.records()[0].last_name(), "Braund");
/// ```
pub fn parse_str(content: &str) -> DataSourceResult<PassengerTable> {
    let delimiter = detect_delimiter(content);
    parse_content(content, delimiter, "utf-8".to_string()).map(|r| r.table)
}

/// Parse decoded text with an explicit delimiter and return metadata.
pub fn parse_content(
    content: &str,
    delimiter: char,
    encoding: String,
) -> DataSourceResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(DataSourceError::EmptyFile);
    }
    let delimiter_byte = u8::try_from(delimiter).map_err(|_| {
        DataSourceError::Unsupported(format!("delimiter '{}' is not a single byte", delimiter))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(canonicalize_header).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(DataSourceError::NoHeaders);
    }

    let index = ColumnIndex::from_headers(&headers)?;
    debug!(columns = ?index.recognized(), "header recognized");

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        // +1 for the header, +1 for 1-based lines
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row_idx + 2);

        if row.iter().all(str::is_empty) {
            continue;
        }

        records.push(RowReader { row: &row, index: &index, line }.read()?);
    }

    Ok(ParseResult {
        table: PassengerTable::new(records),
        encoding,
        delimiter,
        columns: index.recognized(),
        headers,
    })
}

/// Field access for one CSV row.
struct RowReader<'a> {
    row: &'a csv::StringRecord,
    index: &'a ColumnIndex,
    line: usize,
}

impl RowReader<'_> {
    fn read(&self) -> DataSourceResult<PassengerRecord> {
        let siblings_spouses_aboard = self.optional(Column::SibSp, parse_count)?;
        let parents_children_aboard = self.optional(Column::Parch, parse_count)?;
        if let (Some(sibsp), Some(parch)) = (siblings_spouses_aboard, parents_children_aboard) {
            if sibsp.checked_add(parch).and_then(|n| n.checked_add(1)).is_none() {
                return Err(self.invalid(
                    Column::Parch,
                    self.cell(Column::Parch),
                    "family size does not fit in 32 bits",
                ));
            }
        }

        Ok(PassengerRecord {
            passenger_id: self.optional(Column::PassengerId, parse_count)?,
            passenger_class: self.required(Column::Pclass, |v| {
                PassengerClass::from_code(v).ok_or("expected 1, 2 or 3")
            })?,
            name: self.text(Column::Name).unwrap_or_default(),
            sex: self.required(Column::Sex, |v| {
                Sex::from_label(v).ok_or("expected 'male' or 'female'")
            })?,
            age: self.optional(Column::Age, parse_non_negative)?,
            siblings_spouses_aboard,
            parents_children_aboard,
            ticket: self.text(Column::Ticket),
            fare: self.optional(Column::Fare, parse_non_negative)?,
            cabin: self.text(Column::Cabin),
            embarked: self.text(Column::Embarked),
            survived: self.required(Column::Survived, parse_survived)?,
        })
    }

    fn cell(&self, column: Column) -> &str {
        self.index
            .position(column)
            .and_then(|pos| self.row.get(pos))
            .unwrap_or("")
    }

    fn required<T>(
        &self,
        column: Column,
        parse: impl Fn(&str) -> Result<T, &'static str>,
    ) -> DataSourceResult<T> {
        let value = self.cell(column);
        if value.is_empty() {
            return Err(self.invalid(column, value, "required value is missing"));
        }
        parse(value).map_err(|msg| self.invalid(column, value, msg))
    }

    fn optional<T>(
        &self,
        column: Column,
        parse: impl Fn(&str) -> Result<T, &'static str>,
    ) -> DataSourceResult<Option<T>> {
        let value = self.cell(column);
        if is_missing(value) {
            return Ok(None);
        }
        parse(value)
            .map(Some)
            .map_err(|msg| self.invalid(column, value, msg))
    }

    fn text(&self, column: Column) -> Option<String> {
        let value = self.cell(column);
        (!value.is_empty()).then(|| value.to_string())
    }

    fn invalid(&self, column: Column, value: &str, message: &str) -> DataSourceError {
        DataSourceError::invalid_value(self.line, column.canonical_name(), value, message)
    }
}

/// Blank cells and the usual NA spellings mean "unknown".
fn is_missing(value: &str) -> bool {
    value.is_empty() || matches!(value, "NA" | "NaN" | "nan" | "null")
}

fn parse_non_negative(value: &str) -> Result<f64, &'static str> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err("expected a non-negative number"),
        Err(_) => Err("expected a number"),
    }
}

fn parse_count(value: &str) -> Result<u32, &'static str> {
    value
        .parse::<u32>()
        .map_err(|_| "expected a non-negative integer")
}

fn parse_survived(value: &str) -> Result<bool, &'static str> {
    match value.to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err("expected 0 or 1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgeGroup;

    const HEADER: &str = "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked";

    fn csv(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_simple_table() {
        let content = csv(&[
            r#"1,0,3,"Braund, Mr. Owen Harris",male,22,1,0,A/5 21171,7.25,,S"#,
            r#"2,1,1,"Cumings, Mrs. John Bradley (Florence Briggs Thayer)",female,38,1,0,PC 17599,71.2833,C85,C"#,
        ]);
        let table = parse_str(&content).unwrap();

        assert_eq!(table.len(), 2);
        let first = &table.records()[0];
        assert_eq!(first.passenger_id, Some(1));
        assert_eq!(first.passenger_class, PassengerClass::Third);
        assert_eq!(first.name, "Braund, Mr. Owen Harris");
        assert_eq!(first.sex, Sex::Male);
        assert_eq!(first.age, Some(22.0));
        assert_eq!(first.family_size(), Some(2));
        assert_eq!(first.cabin, None);
        assert_eq!(first.embarked.as_deref(), Some("S"));
        assert!(!first.survived);

        let second = &table.records()[1];
        assert!(second.survived);
        assert_eq!(second.cabin.as_deref(), Some("C85"));
        assert_eq!(second.age_group(), Some(AgeGroup::Adult));
    }

    #[test]
    fn test_unknown_age_is_none() {
        let content = csv(&[r#"6,0,3,"Moran, Mr. James",male,,0,0,330877,8.4583,,Q"#]);
        let table = parse_str(&content).unwrap();
        assert_eq!(table.records()[0].age, None);
        assert_eq!(table.known_age_count(), 0);
    }

    #[test]
    fn test_headers_canonicalized() {
        let content = "SURVIVED,PCLASS,NAME,SEX,AGE,SIBSP,PARCH,FARE\n1,2,\"Doe, Jane\",FEMALE,30,0,0,13";
        let result = parse_content(content, ',', "utf-8".into()).unwrap();
        assert_eq!(
            result.headers,
            vec!["survived", "pclass", "name", "sex", "age", "sibsp", "parch", "fare"]
        );
        assert_eq!(result.table.records()[0].sex, Sex::Female);
    }

    #[test]
    fn test_long_form_aliases() {
        let content = "passenger_class,sex,age,siblings_spouses_aboard,parents_children_aboard,fare,name,survived\n\
                       1,male,30,0,0,50,\"Smith, Mr. A\",true";
        let table = parse_str(content).unwrap();
        let r = &table.records()[0];
        assert_eq!(r.passenger_class, PassengerClass::First);
        assert!(r.survived);
        assert_eq!(r.passenger_id, None);
    }

    #[test]
    fn test_missing_age_column_allowed() {
        let content = "Survived,Pclass,Name,Sex,SibSp,Parch,Fare\n0,3,\"Doe, John\",male,0,0,7.9";
        let result = parse_content(content, ',', "utf-8".into()).unwrap();
        assert_eq!(result.table.records()[0].age, None);
        assert!(!result.columns.contains(&"age"));
    }

    #[test]
    fn test_missing_required_column() {
        let content = "Survived,Pclass,Name,Age,SibSp,Parch,Fare\n0,3,\"Doe, John\",20,0,0,7.9";
        let err = parse_str(content).unwrap_err();
        assert!(matches!(err, DataSourceError::MissingColumn(ref c) if c == "sex"));
    }

    #[test]
    fn test_invalid_class_reports_line() {
        let content = csv(&[
            r#"1,0,3,"A, Mr. B",male,22,0,0,X,7.25,,S"#,
            r#"2,0,4,"C, Mr. D",male,22,0,0,X,7.25,,S"#,
        ]);
        let err = parse_str(&content).unwrap_err();
        match err {
            DataSourceError::InvalidValue { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "pclass");
                assert_eq!(value, "4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_age_rejected() {
        let content = csv(&[r#"1,0,3,"A, Mr. B",male,-2,0,0,X,7.25,,S"#]);
        let err = parse_str(&content).unwrap_err();
        assert!(matches!(err, DataSourceError::InvalidValue { ref column, .. } if column == "age"));
    }

    #[test]
    fn test_blank_family_fields_are_unknown() {
        let content = csv(&[r#"1,0,3,"A, Mr. B",male,40,,,X,,,S"#]);
        let table = parse_str(&content).unwrap();
        let r = &table.records()[0];
        assert_eq!(r.siblings_spouses_aboard, None);
        assert_eq!(r.fare, None);
        assert_eq!(r.family_size(), None);
    }

    #[test]
    fn test_family_size_overflow_rejected() {
        let content = csv(&[r#"1,0,3,"Doe, John",male,30,4294967295,0,X,7.25,,S"#]);
        let err = parse_str(&content).unwrap_err();
        match err {
            DataSourceError::InvalidValue { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "parch");
            }
            other => panic!("unexpected error: {other}"),
        }

        let content = csv(&[r#"1,0,3,"Doe, John",male,30,4294967294,0,X,7.25,,S"#]);
        let table = parse_str(&content).unwrap();
        assert_eq!(table.records()[0].family_size(), Some(u32::MAX));
    }

    #[test]
    fn test_blank_name_is_empty_surname() {
        let content = csv(&[r#"1,0,3,,male,30,0,0,X,7.25,,S"#]);
        let table = parse_str(&content).unwrap();
        assert_eq!(table.records()[0].name, "");
        assert_eq!(table.records()[0].last_name(), "");
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let table = parse_str(HEADER).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_payload_error() {
        assert!(matches!(parse_bytes_auto(b""), Err(DataSourceError::EmptyFile)));
        assert!(matches!(parse_str("  \n"), Err(DataSourceError::EmptyFile)));
    }

    #[test]
    fn test_semicolon_delimited() {
        let content = "Survived;Pclass;Name;Sex;Age;SibSp;Parch;Fare\n1;1;Doe, Jane;female;29;0;0;100";
        let result = parse_bytes_auto(content.as_bytes()).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.table.records()[0].last_name(), "Doe");
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
        // 0xA4 is the currency sign in Latin-1, not the euro sign
        assert_eq!(decode_content(&[0xA4], "iso-8859-1"), "\u{a4}");
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_windows_1252() {
        assert_eq!(decode_content(&[0x66, 0xF1, 0x61], "utf-8"), "fña");
    }

    #[test]
    fn test_bom_stripped_from_header() {
        assert_eq!(canonicalize_header("\u{feff}PassengerId"), "passengerid");
        assert_eq!(canonicalize_header("  Pclass "), "pclass");
    }
}
