//! Reading the roster and reading/writing the relationship table.
//!
//! Both tables go through Arrow record batches. Files ending in `.parquet` are read and written
//! as Parquet, everything else as CSV with a header row.

use crate::{
    error::{Error, Result},
    types::{Character, Gender, RelationshipRecord},
};
use arrow_array::{
    cast::AsArray, types::UInt64Type, Array, ArrayRef, BooleanArray, RecordBatch, StringArray,
    UInt64Array,
};
use arrow_csv::{reader::Format, ReaderBuilder, WriterBuilder};
use arrow_schema::{DataType, Field, Schema};
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};
use std::{
    fs::File,
    io::{BufWriter, Seek},
    path::Path,
    sync::Arc,
};
use tracing::{debug, info};

/// Reads `name,gender` rows. Columns are found by header name, so extra columns are fine.
pub fn read_roster(path: impl AsRef<Path>) -> Result<Vec<Character>> {
    let path = path.as_ref();
    let batches = read_batches(path, &[])?;

    let mut roster = Vec::new();
    for batch in batches {
        let names = string_column(&batch, "name")?;
        let genders = string_column(&batch, "gender")?;

        for i in 0..batch.num_rows() {
            // Header is line 1, so the first character is on line 2
            let row = roster.len() + 2;
            let gender_text = if genders.is_null(i) { "" } else { genders.value(i) };
            let gender: Gender = gender_text
                .parse()
                .map_err(|value| Error::InvalidGender { row, value })?;

            let name = if names.is_null(i) { "" } else { names.value(i) };
            roster.push(Character::new(name.trim(), gender));
        }
    }

    info!(path = %path.display(), characters = roster.len(), "read roster");
    Ok(roster)
}

/// Writes the table with columns `A, B, type, selfcest, count`, in the order given.
pub fn write_relationships(records: &[RelationshipRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let mut a = Vec::with_capacity(records.len());
    let mut b = Vec::with_capacity(records.len());
    let mut kinds = Vec::with_capacity(records.len());
    let mut selfcest = Vec::with_capacity(records.len());
    let mut counts = Vec::with_capacity(records.len());

    for record in records {
        a.push(record.a.as_str());
        b.push(record.b.as_str());
        kinds.push(record.kind.as_str());
        selfcest.push(record.selfcest);
        counts.push(record.count);
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(a)),
        Arc::new(StringArray::from(b)),
        Arc::new(StringArray::from(kinds)),
        Arc::new(BooleanArray::from(selfcest)),
        Arc::new(UInt64Array::from(counts)),
    ];

    record_batch(relationship_schema(), path, columns)?;
    info!(path = %path.display(), rows = records.len(), "wrote relationships");
    Ok(())
}

/// Reads back a table written by [`write_relationships`]. The pandas spelling of booleans
/// (`True`/`False`) is accepted too.
pub fn read_relationships(path: impl AsRef<Path>) -> Result<Vec<RelationshipRecord>> {
    let path = path.as_ref();
    let batches = read_batches(
        path,
        &[("selfcest", DataType::Boolean), ("count", DataType::UInt64)],
    )?;

    let mut records = Vec::new();
    for batch in batches {
        let a = string_column(&batch, "A")?;
        let b = string_column(&batch, "B")?;
        let kinds = string_column(&batch, "type")?;
        let selfcest = column(&batch, "selfcest")?
            .as_boolean_opt()
            .ok_or_else(|| Error::MissingColumn(String::from("selfcest")))?;
        let counts = column(&batch, "count")?
            .as_primitive_opt::<UInt64Type>()
            .ok_or_else(|| Error::MissingColumn(String::from("count")))?;

        for i in 0..batch.num_rows() {
            records.push(RelationshipRecord {
                a: a.value(i).to_owned(),
                b: b.value(i).to_owned(),
                kind: kinds.value(i).to_owned(),
                selfcest: !selfcest.is_null(i) && selfcest.value(i),
                count: (!counts.is_null(i)).then(|| counts.value(i)),
            });
        }
    }

    debug!(path = %path.display(), rows = records.len(), "read relationships");
    Ok(records)
}

fn relationship_schema() -> Schema {
    Schema::new(vec![
        Field::new("A", DataType::Utf8, false),
        Field::new("B", DataType::Utf8, false),
        Field::new("type", DataType::Utf8, false),
        Field::new("selfcest", DataType::Boolean, false),
        Field::new("count", DataType::UInt64, true),
    ])
}

fn is_parquet(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}

// Records one batch to a parquet or csv file, depending on the extension
fn record_batch(schema: Schema, path: &Path, record_vec: Vec<ArrayRef>) -> Result<()> {
    let to_write = RecordBatch::try_new(Arc::new(schema), record_vec)?;
    let buffer = BufWriter::new(File::create(path)?);

    if is_parquet(path) {
        let mut writer = ArrowWriter::try_new(buffer, to_write.schema(), None)?;
        writer.write(&to_write)?;
        writer.close()?;
    } else {
        let mut writer = WriterBuilder::new().with_header(true).build(buffer);
        writer.write(&to_write)?;
    }

    Ok(())
}

// Reads every batch of a file. For csv the header decides the column names; columns listed in
// `typed` get that type and everything else is read as text.
fn read_batches(path: &Path, typed: &[(&str, DataType)]) -> Result<Vec<RecordBatch>> {
    let mut file = File::open(path)?;

    if is_parquet(path) {
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        return Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?);
    }

    let (header, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(0))?;
    file.rewind()?;

    let fields: Vec<Field> = header
        .fields()
        .iter()
        .map(|field| {
            let data_type = typed
                .iter()
                .find(|(name, _)| name == field.name())
                .map(|(_, data_type)| data_type.clone())
                .unwrap_or(DataType::Utf8);
            Field::new(field.name(), data_type, true)
        })
        .collect();

    let reader = ReaderBuilder::new(Arc::new(Schema::new(fields)))
        .with_header(true)
        .build(file)?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| Error::MissingColumn(name.to_owned()))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    column(batch, name)?
        .as_string_opt::<i32>()
        .ok_or_else(|| Error::MissingColumn(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{enumerate_pairs, Fandom};
    use std::fs;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("temp file should be writable");
        path
    }

    fn sample_records() -> Vec<RelationshipRecord> {
        let roster = vec![
            Character::new("Vi", Gender::F),
            Character::new("Caitlyn", Gender::F),
            Character::new("Jayce", Gender::M),
        ];

        enumerate_pairs(&Fandom::default(), &roster)
            .into_iter()
            .enumerate()
            .map(|(i, r)| r.with_count(i as u64 * 1000))
            .collect()
    }

    #[test]
    fn reads_roster_by_header_name() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(
            dir.path(),
            "characters.csv",
            "gender,name,notes\nf,Vi,\nm,Mel Medarda,fine\nother,Someone, \n",
        );

        let roster = read_roster(&path).expect("roster should load");
        assert_eq!(
            roster,
            vec![
                Character::new("Vi", Gender::F),
                Character::new("Mel Medarda", Gender::M),
                Character::new("Someone", Gender::Other),
            ]
        );
    }

    #[test]
    fn bad_gender_names_the_row() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(dir.path(), "characters.csv", "name,gender\nVi,f\nJayce,x\n");

        match read_roster(&path) {
            Err(Error::InvalidGender { row, value }) => {
                assert_eq!(row, 3);
                assert_eq!(value, "x");
            }
            other => panic!("expected an invalid gender error, got {:?}", other),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(dir.path(), "characters.csv", "name\nVi\n");

        assert!(matches!(read_roster(&path), Err(Error::MissingColumn(c)) if c == "gender"));
    }

    #[test]
    fn csv_table_has_expected_header_and_rows() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("relationships.csv");
        let records = sample_records();

        write_relationships(&records, &path).expect("write should succeed");
        let text = fs::read_to_string(&path).expect("output should exist");
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some("A,B,type,selfcest,count"));
        assert_eq!(lines.next(), Some("Vi,Vi,f/f,true,0"));
        assert_eq!(lines.count(), records.len() - 1);
    }

    #[test]
    fn csv_table_reads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("relationships.csv");
        let records = sample_records();

        write_relationships(&records, &path).expect("write should succeed");
        assert_eq!(read_relationships(&path).expect("read should succeed"), records);
    }

    #[test]
    fn parquet_table_reads_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("relationships.parquet");
        let records = sample_records();

        write_relationships(&records, &path).expect("write should succeed");
        assert_eq!(read_relationships(&path).expect("read should succeed"), records);
    }

    #[test]
    fn reads_pandas_style_table() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = write_file(
            dir.path(),
            "relationships.csv",
            "A,B,type,selfcest,count\nVi,Vi,f/f,True,3\nCaitlyn,Vi,f/f,False,1234\nJinx,Vi,f/f,False,\n",
        );

        let records = read_relationships(&path).expect("read should succeed");
        assert_eq!(records.len(), 3);
        assert!(records[0].selfcest);
        assert_eq!(records[1].count, Some(1234));
        assert!(!records[1].selfcest);
        assert_eq!(records[2].count, None);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nope").join("relationships.csv");

        assert!(matches!(
            write_relationships(&sample_records(), &path),
            Err(Error::Io(_))
        ));
    }
}
