//! CSV export of priced items

use std::io;
use std::path::Path;

use crate::error::Result;
use crate::models::PricedItem;

pub const EXPORT_HEADERS: [&str; 5] = ["Name", "Type", "Price", "Value", "Asset ID"];

/// Writes one row per item: display name, type, price string, numeric value
/// (two decimals) and asset id.
pub fn write_csv<W: io::Write>(writer: W, items: &[PricedItem]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;

    for item in items {
        wtr.write_record([
            item.name.as_str(),
            item.item_type.as_str(),
            item.price.as_str(),
            format!("{:.2}", item.value).as_str(),
            item.asset_id.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn export_to_path(path: impl AsRef<Path>, items: &[PricedItem]) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    write_csv(io::BufWriter::new(file), items)?;
    log::info!("Exported {} items to {}", items.len(), path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, price: &str, value: f64, asset_id: &str) -> PricedItem {
        PricedItem {
            asset_id: asset_id.to_string(),
            app_id: 730,
            context_id: "2".to_string(),
            amount: 1,
            name: name.to_string(),
            market_name: name.to_string(),
            market_hash_name: name.to_string(),
            item_type: "Classified Rifle".to_string(),
            price: price.to_string(),
            value,
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let items = vec![
            item("AK-47 | Redline", "1 052,36 руб. (lowest)", 1052.36, "111"),
            item("Sticker, Holo", "7,5 руб. (lowest)", 7.5, "222"),
        ];

        let mut out = Vec::new();
        write_csv(&mut out, &items).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Name,Type,Price,Value,Asset ID");
        assert_eq!(
            lines[1],
            "AK-47 | Redline,Classified Rifle,\"1 052,36 руб. (lowest)\",1052.36,111"
        );
        // Fields containing commas are quoted
        assert!(lines[2].starts_with("\"Sticker, Holo\""));
        assert!(lines[2].ends_with(",7.50,222"));
    }

    #[test]
    fn exports_to_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("inventory.csv");

        export_to_path(&path, &[item("Case", "3 руб. (lowest)", 3.0, "9")]).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "Case");
        assert_eq!(&rows[0][3], "3.00");
    }

    #[test]
    fn empty_export_has_only_header() {
        let mut out = Vec::new();
        write_csv(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Name,Type,Price,Value,Asset ID\n");
    }
}
