// ==========================================
// 人事取込バックエンド - 取込模板
// ==========================================
// 职责: 生成与表头字典一致的空白模板（仅表头行）
// ==========================================

use crate::domain::types::EntityKind;
use crate::importer::error::DecodeError;
use crate::importer::header_dictionary;
use std::io::Write;
use std::path::Path;

/// 模板表头（字典首选别名，声明顺序）
pub fn template_columns(kind: EntityKind) -> Vec<String> {
    header_dictionary::template_headers(kind)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// 将模板表头写入任意 writer
pub fn write_csv_header<W: Write>(writer: W, kind: EntityKind) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header_dictionary::template_headers(kind))?;
    wtr.flush()?;
    Ok(())
}

/// 写出 CSV 模板文件
pub fn write_csv_template(path: &Path, kind: EntityKind) -> Result<(), DecodeError> {
    let file = std::fs::File::create(path)?;
    write_csv_header(file, kind)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::CsvParser;
    use crate::importer::importer_trait::FileParser;

    #[test]
    fn test_template_headers_map_back_to_dictionary() {
        for kind in [EntityKind::Employee, EntityKind::TimerCard] {
            for header in template_columns(kind) {
                assert!(
                    header_dictionary::lookup(kind, &header).is_some(),
                    "{} not mapped for {}",
                    header,
                    kind
                );
            }
        }
    }

    #[test]
    fn test_template_file_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timer_cards.csv");

        write_csv_template(&path, EntityKind::TimerCard).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("日付,"));
        assert_eq!(content.lines().count(), 1);

        // 模板本身不可取込（无数据行）
        assert!(matches!(
            CsvParser.open(&path),
            Err(DecodeError::NoDataRows)
        ));
    }
}
