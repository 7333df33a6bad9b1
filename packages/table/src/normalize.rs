//! Header normalization for uploaded property tables.
//!
//! Spreadsheet exports carry human-typed headers ("Avalúo Catastral ",
//! "VEREDA"). Every header is passed through [`normalize_header`] so the
//! rest of the toolchain can address columns by fixed keys.

/// Accented vowels and their plain replacements. Applied after lowercasing,
/// so uppercase accented vowels are covered too.
const ACCENT_REPLACEMENTS: &[(char, char)] =
    &[('á', 'a'), ('é', 'e'), ('í', 'i'), ('ó', 'o'), ('ú', 'u')];

/// Normalizes a single column header.
///
/// The pipeline:
/// 1. Trim surrounding whitespace
/// 2. Lowercase
/// 3. Replace every space with `_`
/// 4. Strip accents from á é í ó ú
///
/// Applying it to an already normalized header is a no-op.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c == ' ' {
                return '_';
            }
            ACCENT_REPLACEMENTS
                .iter()
                .find_map(|(accented, plain)| (*accented == c).then_some(*plain))
                .unwrap_or(c)
        })
        .collect()
}

/// Normalizes every header in order.
#[must_use]
pub fn normalize_headers<'a>(headers: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    headers.into_iter().map(normalize_header).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_header("  VEREDA "), "vereda");
    }

    #[test]
    fn replaces_internal_spaces() {
        assert_eq!(
            normalize_header("Valor Impuesto a Pagar"),
            "valor_impuesto_a_pagar"
        );
    }

    #[test]
    fn keeps_each_space_as_an_underscore() {
        assert_eq!(normalize_header("sector  urbano"), "sector__urbano");
    }

    #[test]
    fn strips_accents() {
        assert_eq!(normalize_header("Avalúo Catastral"), "avaluo_catastral");
        assert_eq!(
            normalize_header("FINANCIACIÓN IMPUESTO PREDIAL"),
            "financiacion_impuesto_predial"
        );
        assert_eq!(normalize_header("Área construida"), "area_construida");
        assert_eq!(normalize_header("destino económico predio"), "destino_economico_predio");
    }

    #[test]
    fn is_idempotent() {
        let raw = [
            " Pago Impuesto Predial",
            "LATITUD",
            "Área Construida ",
            "propiedad horizontal",
            "already_normal",
            "Ñame señal",
        ];
        let once = normalize_headers(raw);
        let twice = normalize_headers(once.iter().map(String::as_str));
        assert_eq!(once, twice);
    }
}
