use std::io::Write;
use std::path::Path;

use anyhow::Result;
use pathseek_indexer::IndexStats;
use pathseek_protocol::MatchRecord;
use serde::Serialize;

#[derive(Serialize)]
struct IndexReport<'a> {
    root: String,
    #[serde(flatten)]
    stats: &'a IndexStats,
}

pub fn write_matches(out: &mut impl Write, records: &[MatchRecord], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, records)?;
        writeln!(out)?;
        return Ok(());
    }
    for record in records {
        writeln!(out, "{} ({})", record.path, record.goodness)?;
    }
    Ok(())
}

pub fn write_stats(out: &mut impl Write, root: &Path, stats: &IndexStats, json: bool) -> Result<()> {
    if json {
        let report = IndexReport {
            root: root.display().to_string(),
            stats,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(
        out,
        "Indexed {} files in {} directories under {} ({} rejected, {} hidden, {} bytes, {} ms)",
        stats.files,
        stats.groups,
        root.display(),
        stats.rejected,
        stats.hidden,
        stats.bytes,
        stats.time_ms
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn text_matches_show_goodness() {
        let mut out = Vec::new();
        let records = vec![
            MatchRecord::new(b"src", b"main.c", 2),
            MatchRecord::new(b"", b"Makefile", 0),
        ];
        write_matches(&mut out, &records, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "src/main.c (2)\nMakefile (0)\n"
        );
    }

    #[test]
    fn json_stats_are_flat() {
        let mut out = Vec::new();
        let stats = IndexStats {
            files: 2,
            groups: 1,
            ..IndexStats::default()
        };
        write_stats(&mut out, Path::new("root"), &stats, true).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["root"], "root");
        assert_eq!(value["files"], 2);
        assert_eq!(value["groups"], 1);
    }
}
