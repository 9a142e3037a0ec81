//! Fills gaps in the application's bundled gettext catalog. Only entries
//! whose `msgstr` is empty are touched; existing translations win.

use anyhow::{Context, Result};
use log::info;
use regex::{NoExpand, Regex};
use std::fs;
use std::path::Path;

/// Corrections for untranslated strings in the German UI catalog shipped
/// with the embedded application build.
pub fn default_overrides() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DELETE", "LÖSCHEN"),
        ("OVERWRITE", "ÜBERSCHREIBEN"),
        ("GROUP BY", "GRUPPIEREN NACH"),
        ("NOT GROUPED BY", "NICHT GRUPPIERT"),
        ("Group by settings (%s)", "Gruppierungseinstellungen (%s)"),
        ("Dynamic group by name", "Dynamische Gruppierung nach Name"),
        ("Name your dynamic group by", "Benennen Sie Ihre dynamische Gruppierung"),
        (
            "Your changes will be lost if you leave without saving.",
            "Ihre Änderungen gehen verloren, wenn Sie die Seite ohne Speichern verlassen.",
        ),
        (
            "Add description that will be displayed when hovering over the label...",
            "Beschreibung hinzufügen, die beim Überfahren der Beschriftung angezeigt wird...",
        ),
        ("step-after", "Stufe-danach"),
        ("step-before", "Stufe-davor"),
        ("pivoted_xlsx", "Pivot-Tabelle_xlsx"),
        ("error_message", "Fehlermeldung"),
        ("valuename", "Wertname"),
        ("bolt", "Blitz"),
    ]
}

/// Fill empty `msgstr ""` entries for the given msgids. Returns the patched
/// content and the number of entries filled.
pub fn apply_overrides(content: &str, overrides: &[(&str, &str)]) -> Result<(String, usize)> {
    let mut patched = content.to_string();
    let mut filled = 0usize;

    for (msgid, msgstr) in overrides {
        let pattern = format!("msgid \"{}\"\nmsgstr \"\"", regex::escape(msgid));
        let regex = Regex::new(&pattern).context("invalid catalog pattern")?;
        if regex.is_match(&patched) {
            let replacement = format!("msgid \"{}\"\nmsgstr \"{}\"", msgid, msgstr);
            patched = regex
                .replace(&patched, NoExpand(&replacement))
                .into_owned();
            filled += 1;
        }
    }

    Ok((patched, filled))
}

/// Patch a catalog file in place. The file is rewritten only when something
/// actually changed.
pub fn patch_catalog(path: &Path, overrides: &[(&str, &str)]) -> Result<usize> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read catalog {}", path.display()))?;
    let (patched, filled) = apply_overrides(&content, overrides)?;
    if filled > 0 {
        fs::write(path, patched)
            .with_context(|| format!("cannot write catalog {}", path.display()))?;
    }
    info!("filled {} catalog entries in {}", filled, path.display());
    Ok(filled)
}
