//! Parser for `pdfinfo` output.
//!
//! `pdfinfo` prints colon-delimited key/value lines:
//!
//! ```text
//! Producer:       LibreOffice 7.4
//! CreationDate:   Wed Feb  1 10:15:02 2023 UTC
//! Pages:          12
//! Page size:      595.28 x 841.89 pts (A4)
//! PDF version:    1.6
//! ```

use crate::external::ToolResult;
use crate::parsers::{ParsedTool, ToolParser};
use crate::record::{fields, PartialRecord};

pub struct PdfinfoParser;

impl ToolParser for PdfinfoParser {
    fn parse(&self, result: &ToolResult) -> ParsedTool {
        let mut fields_out = PartialRecord::new();

        for line in result.stdout.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "Pages" => {
                    if let Ok(pages) = value.parse::<i64>() {
                        fields_out.set(fields::PAGE_COUNT, pages);
                    } else {
                        log::debug!("Unparseable pdfinfo page count: {value:?}");
                    }
                }
                "Page size" => fields_out.set(fields::PAGE_SIZE, value),
                "PDF version" => fields_out.set(fields::PDF_VERSION, value),
                "Producer" => fields_out.set(fields::PRODUCER, value),
                "Creator" => fields_out.set(fields::CREATOR, value),
                "CreationDate" => fields_out.set(fields::CREATION_DATE, value),
                _ => {}
            }
        }

        if fields_out.get(fields::PAGE_COUNT).is_some() {
            fields_out.set(fields::FORMAT, "pdf");
        }

        ParsedTool {
            fields: fields_out,
            streams: Vec::new(),
        }
    }
}
