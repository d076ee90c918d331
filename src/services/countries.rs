//! Country name to flag lookup.
//!
//! Feeds report countries as free text such as `"Pakistan-PTCL"` or
//! `"Nigeria MTN"`. Only the first word is significant, so multi-word
//! names are keyed by their first word when it is unambiguous.

/// Fallback glyph for unknown countries.
pub const GLOBE: &str = "🌐";

/// First word of a country name (lowercase) and its ISO 3166-1 alpha-2 code.
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("afghanistan", "AF"),
    ("albania", "AL"),
    ("algeria", "DZ"),
    ("angola", "AO"),
    ("argentina", "AR"),
    ("armenia", "AM"),
    ("australia", "AU"),
    ("austria", "AT"),
    ("azerbaijan", "AZ"),
    ("bahrain", "BH"),
    ("bangladesh", "BD"),
    ("belarus", "BY"),
    ("belgium", "BE"),
    ("benin", "BJ"),
    ("bolivia", "BO"),
    ("brazil", "BR"),
    ("bulgaria", "BG"),
    ("burkina", "BF"),
    ("cambodia", "KH"),
    ("cameroon", "CM"),
    ("canada", "CA"),
    ("chad", "TD"),
    ("chile", "CL"),
    ("china", "CN"),
    ("colombia", "CO"),
    ("congo", "CG"),
    ("costa", "CR"),
    ("croatia", "HR"),
    ("cyprus", "CY"),
    ("czechia", "CZ"),
    ("denmark", "DK"),
    ("dominican", "DO"),
    ("ecuador", "EC"),
    ("egypt", "EG"),
    ("el", "SV"),
    ("estonia", "EE"),
    ("ethiopia", "ET"),
    ("finland", "FI"),
    ("france", "FR"),
    ("gabon", "GA"),
    ("gambia", "GM"),
    ("georgia", "GE"),
    ("germany", "DE"),
    ("ghana", "GH"),
    ("greece", "GR"),
    ("guatemala", "GT"),
    ("guinea", "GN"),
    ("haiti", "HT"),
    ("honduras", "HN"),
    ("hong", "HK"),
    ("hungary", "HU"),
    ("india", "IN"),
    ("indonesia", "ID"),
    ("iran", "IR"),
    ("iraq", "IQ"),
    ("ireland", "IE"),
    ("israel", "IL"),
    ("italy", "IT"),
    ("ivory", "CI"),
    ("jamaica", "JM"),
    ("japan", "JP"),
    ("jordan", "JO"),
    ("kazakhstan", "KZ"),
    ("kenya", "KE"),
    ("kuwait", "KW"),
    ("kyrgyzstan", "KG"),
    ("laos", "LA"),
    ("latvia", "LV"),
    ("lebanon", "LB"),
    ("liberia", "LR"),
    ("libya", "LY"),
    ("lithuania", "LT"),
    ("madagascar", "MG"),
    ("malawi", "MW"),
    ("malaysia", "MY"),
    ("mali", "ML"),
    ("mexico", "MX"),
    ("moldova", "MD"),
    ("mongolia", "MN"),
    ("morocco", "MA"),
    ("mozambique", "MZ"),
    ("myanmar", "MM"),
    ("nepal", "NP"),
    ("netherlands", "NL"),
    ("nicaragua", "NI"),
    ("niger", "NE"),
    ("nigeria", "NG"),
    ("norway", "NO"),
    ("oman", "OM"),
    ("pakistan", "PK"),
    ("palestine", "PS"),
    ("panama", "PA"),
    ("paraguay", "PY"),
    ("peru", "PE"),
    ("philippines", "PH"),
    ("poland", "PL"),
    ("portugal", "PT"),
    ("qatar", "QA"),
    ("romania", "RO"),
    ("russia", "RU"),
    ("rwanda", "RW"),
    ("saudi", "SA"),
    ("senegal", "SN"),
    ("serbia", "RS"),
    ("sierra", "SL"),
    ("singapore", "SG"),
    ("slovakia", "SK"),
    ("somalia", "SO"),
    ("spain", "ES"),
    ("sri", "LK"),
    ("sudan", "SD"),
    ("sweden", "SE"),
    ("switzerland", "CH"),
    ("syria", "SY"),
    ("taiwan", "TW"),
    ("tajikistan", "TJ"),
    ("tanzania", "TZ"),
    ("thailand", "TH"),
    ("togo", "TG"),
    ("tunisia", "TN"),
    ("turkey", "TR"),
    ("uae", "AE"),
    ("uganda", "UG"),
    ("uk", "GB"),
    ("ukraine", "UA"),
    ("uruguay", "UY"),
    ("usa", "US"),
    ("uzbekistan", "UZ"),
    ("venezuela", "VE"),
    ("vietnam", "VN"),
    ("yemen", "YE"),
    ("zambia", "ZM"),
    ("zimbabwe", "ZW"),
];

/// Look up the ISO code for a country word.
pub fn country_code(name: &str) -> Option<&'static str> {
    let key = name.trim().to_lowercase();
    COUNTRY_CODES
        .iter()
        .find(|(country, _)| *country == key)
        .map(|(_, code)| *code)
}

/// Flag glyph for a country word, or the globe when unknown.
pub fn flag_for(name: &str) -> String {
    country_code(name)
        .and_then(flag_from_code)
        .unwrap_or_else(|| GLOBE.to_string())
}

/// Build a flag from two ASCII letters using regional indicator symbols.
fn flag_from_code(code: &str) -> Option<String> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    code.chars()
        .map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_country() {
        assert_eq!(country_code("Pakistan"), Some("PK"));
        assert_eq!(flag_for("Pakistan"), "🇵🇰");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(flag_for("NIGERIA"), "🇳🇬");
        assert_eq!(flag_for(" india "), "🇮🇳");
    }

    #[test]
    fn test_unknown_country_falls_back_to_globe() {
        assert_eq!(flag_for("Atlantis"), GLOBE);
        assert_eq!(flag_for(""), GLOBE);
    }

    #[test]
    fn test_table_codes_are_valid() {
        for (name, code) in COUNTRY_CODES {
            assert!(flag_from_code(code).is_some(), "bad code for {}", name);
            assert_eq!(name.to_lowercase(), *name);
        }
    }
}
