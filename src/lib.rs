//! Headless reading core for a single long-form book.
//!
//! - `content` loads the chapter list.
//! - `classifier` turns chapter text into typed paragraph blocks.
//! - `reader` owns the reading session of one open reader view and persists
//!   it through `cache`.
//! - `layout` wraps classified blocks into lines for terminal hosts.

pub mod cache;
pub mod cancellation;
pub mod classifier;
pub mod config;
pub mod content;
pub mod debounce;
pub mod layout;
pub mod reader;
pub mod session;
pub mod theme;

use std::fs;
use std::path::Path;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Regenerate the TypeScript view types consumed by web hosts.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<theme::ThemeId>(out_dir)?;
    export_single_type::<theme::ThemeAttributes>(out_dir)?;
    export_single_type::<classifier::ParagraphKind>(out_dir)?;
    export_single_type::<classifier::ParagraphBlock>(out_dir)?;
    export_single_type::<reader::ReaderPhase>(out_dir)?;
    export_single_type::<reader::ChapterListEntry>(out_dir)?;
    export_single_type::<reader::ReaderSnapshot>(out_dir)?;

    let index_content = r#"export type { ThemeId } from "./ThemeId";
export type { ThemeAttributes } from "./ThemeAttributes";
export type { ParagraphKind } from "./ParagraphKind";
export type { ParagraphBlock } from "./ParagraphBlock";
export type { ReaderPhase } from "./ReaderPhase";
export type { ChapterListEntry } from "./ChapterListEntry";
export type { ReaderSnapshot } from "./ReaderSnapshot";
"#;
    let index_path = out_dir.join("index.ts");
    fs::write(&index_path, index_content)
        .map_err(|err| format!("Failed to write {}: {err}", index_path.display()))?;

    Ok(())
}
