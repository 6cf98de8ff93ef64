use crate::decompiler::context::Context;
use crate::decompiler::decoders::split_list;
use crate::messages::MessageCode;

/// `ProtectFile` with `ProtectRange` pairs under each image family
pub(super) fn finalize_family_file_ranges_table(ctx: &mut Context<'_>) {
    let db = ctx.db;

    for row in db.rows("FamilyFileRanges") {
        let Some(family) = ctx.require(&row, "Family", "ImageFamilies") else {
            continue;
        };

        let offsets = split_list(row.str("RetainOffsets"));
        let lengths = split_list(row.str("RetainLengths"));
        if offsets.len() != lengths.len() {
            ctx.warn(
                MessageCode::FamilyFileRangesMismatch,
                &row,
                format!(
                    "{} retain offsets but {} retain lengths for '{}'",
                    offsets.len(),
                    lengths.len(),
                    row.primary_key()
                ),
            );
            continue;
        }

        let protect = ctx.doc.create_child(family, "ProtectFile");
        ctx.doc.set_optional(protect, "File", row.str("FTK"));
        for (offset, length) in offsets.into_iter().zip(lengths) {
            let range = ctx.doc.create_child(protect, "ProtectRange");
            ctx.doc.set_attribute(range, "Offset", offset);
            ctx.doc.set_attribute(range, "Length", length);
        }
    }
}
