use crate::core::session::Session;
use crate::utils::error::Result;
use crate::utils::validation::validate_path;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    development_id: i64,
    development: &'a str,
    block_code: &'a str,
    block: &'a str,
    unit_id: i64,
    unit: &'a str,
    status: &'a str,
    typology: &'a str,
    value: Option<f64>,
    owned: bool,
}

/// Writes every unit of the visible (search-filtered) tree, in tree order,
/// with its pending ownership. Expansion state does not hide rows here.
pub fn write_csv<W: Write>(writer: W, session: &mut Session) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut written = 0;

    let (tree, selection) = session.view();

    for development in &tree.developments {
        for block in &development.blocks {
            for unit in &block.units {
                wtr.serialize(ExportRow {
                    development_id: development.id,
                    development: &development.name,
                    block_code: block.key.block.as_code().unwrap_or(""),
                    block: &block.name,
                    unit_id: unit.id,
                    unit: &unit.name,
                    status: &unit.status,
                    typology: unit.typology.as_deref().unwrap_or(""),
                    value: unit.value,
                    owned: selection.is_selected(unit.id),
                })?;
                written += 1;
            }
        }
    }

    wtr.flush()?;
    Ok(written)
}

pub fn export_to_path(path: &str, session: &mut Session) -> Result<usize> {
    validate_path("export.output", path)?;
    let file = std::fs::File::create(path)?;
    let written = write_csv(file, session)?;
    tracing::info!("Exported {} unit(s) to {}", written, path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LoadedUnits, Unit};
    use std::sync::Arc;

    fn session() -> Session {
        let unit = |id: i64, block: Option<&str>, owned: bool| Unit {
            id,
            name: format!("{}", 100 + id),
            development_id: 1,
            development_name: "Edificio A".to_string(),
            block_code: block.map(str::to_string),
            block_name: block.map(|b| format!("Bloco {}", b)),
            status: "available".to_string(),
            value: Some(1500.5),
            typology: None,
            is_owned: owned,
        };
        Session::new(LoadedUnits {
            group: 1,
            total: 3,
            units: Arc::new(vec![unit(1, Some("1"), true), unit(2, Some("2"), false), unit(3, None, false)]),
        })
    }

    #[test]
    fn test_csv_has_header_and_pending_ownership() {
        let mut session = session();
        session.selection_mut().toggle_unit(2);
        let mut out = Vec::new();

        let written = write_csv(&mut out, &mut session).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(written, 3);
        assert_eq!(
            lines[0],
            "development_id,development,block_code,block,unit_id,unit,status,typology,value,owned"
        );
        assert_eq!(lines[1], "1,Edificio A,,,3,103,available,,1500.5,false");
        assert_eq!(lines[2], "1,Edificio A,1,Bloco 1,1,101,available,,1500.5,true");
        assert_eq!(lines[3], "1,Edificio A,2,Bloco 2,2,102,available,,1500.5,true");
    }

    #[test]
    fn test_csv_respects_query() {
        let mut session = session();
        session.set_query("bloco 2");
        let mut out = Vec::new();

        assert_eq!(write_csv(&mut out, &mut session).unwrap(), 1);
    }
}
