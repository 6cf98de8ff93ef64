use crate::attributes::FileAttributes;
use crate::decompiler::context::Context;
use crate::decompiler::standard::{is_standard_directory, TARGETDIR};
use crate::names::get_name;
use crate::types::{Database, OutputKind, RowView};
use std::collections::HashSet;

/// Assign disk ids and source paths to files.
///
/// A file lives on the first disk, in ascending disk id order, whose
/// LastSequence covers the file's Sequence. Compressed files point into the
/// exported File folder; uncompressed files point at their location in the
/// source image.
pub(super) fn finalize_file_table(ctx: &mut Context<'_>) {
    let db = ctx.db;

    let mut media: Vec<(i64, i64)> = db
        .rows("Media")
        .iter()
        .filter_map(|row| Some((row.int("DiskId")?, row.int("LastSequence").unwrap_or(0))))
        .collect();
    media.sort_unstable();

    for row in db.rows("File") {
        let Some(file) = ctx.index.get_row(&row) else {
            continue;
        };
        let Some(id) = row.str("File") else {
            continue;
        };

        let sequence = row.int("Sequence").unwrap_or(0);
        if let Some(&(disk_id, _)) = media.iter().find(|(_, last)| *last >= sequence) {
            if disk_id != 1 {
                ctx.doc.set_attribute(file, "DiskId", disk_id.to_string());
            }
        }

        let source = source_path(ctx, db, &row, id);
        ctx.doc.set_attribute(file, "Source", source);
    }
}

fn source_path(ctx: &Context<'_>, db: &Database, row: &RowView<'_>, id: &str) -> String {
    let bits = FileAttributes::from_bits_truncate(row.int("Attributes").unwrap_or(0) as u32);
    let compressed = bits.contains(FileAttributes::COMPRESSED)
        || (ctx.compressed && !bits.contains(FileAttributes::NONCOMPRESSED));

    if ctx.output_kind() == OutputKind::Module || compressed {
        return ctx.export_path("File", id);
    }

    let long_names = !ctx.short_names;
    let name = row
        .str("FileName")
        .and_then(|value| get_name(value, false, long_names))
        .unwrap_or_else(|| id.to_string());

    if ctx.compressed {
        return format!("{}\\{}", ctx.options.base_source_path, name);
    }

    let directory = row
        .str("Component_")
        .and_then(|component| db.find_row("Component", component))
        .and_then(|component| component.str("Directory_"));

    let mut segments = vec![name];
    if let Some(directory) = directory {
        segments.extend(directory_segments(ctx, db, directory, long_names));
    }
    segments.reverse();
    segments.join("\\")
}

/// Source names from `directory` up to the root, innermost first
fn directory_segments(ctx: &Context<'_>, db: &Database, directory: &str, long_names: bool) -> Vec<String> {
    let mut segments = Vec::new();
    let mut visited = HashSet::new();
    let mut current = Some(directory.to_string());

    while let Some(id) = current.take() {
        if !visited.insert(id.clone()) {
            break;
        }
        if id == TARGETDIR {
            segments.push(ctx.options.base_source_path.clone());
            break;
        }
        if is_standard_directory(&id) {
            segments.push(id);
            break;
        }
        let Some(row) = db.find_row("Directory", &id) else {
            break;
        };
        if let Some(name) = row
            .str("DefaultDir")
            .and_then(|value| get_name(value, true, long_names))
            .filter(|name| name != ".")
        {
            segments.push(name);
        }
        current = row
            .str("Directory_Parent")
            .filter(|parent| *parent != id)
            .map(str::to_string);
    }

    segments
}
