//! Nationality name to flag-code lookup for the flag CDN.

const NATIONALITY_CODES: &[(&str, &str)] = &[
    ("france", "fr"),
    ("england", "gb"),
    ("germany", "de"),
    ("spain", "es"),
    ("italy", "it"),
    ("portugal", "pt"),
    ("netherlands", "nl"),
    ("brazil", "br"),
    ("argentina", "ar"),
    ("belgium", "be"),
    ("croatia", "hr"),
    ("uruguay", "uy"),
    ("poland", "pl"),
    ("denmark", "dk"),
    ("norway", "no"),
    ("sweden", "se"),
    ("switzerland", "ch"),
    ("austria", "at"),
    ("turkey", "tr"),
    ("morocco", "ma"),
    ("united states", "us"),
    ("canada", "ca"),
    ("mexico", "mx"),
    ("japan", "jp"),
    ("south korea", "kr"),
    ("korea republic", "kr"),
    ("serbia", "rs"),
    ("slovenia", "si"),
    ("czech republic", "cz"),
    ("czechia", "cz"),
    ("slovakia", "sk"),
    ("hungary", "hu"),
    ("russia", "ru"),
    ("ukraine", "ua"),
    ("ghana", "gh"),
    ("nigeria", "ng"),
    ("cameroon", "cm"),
    ("senegal", "sn"),
    ("ivory coast", "ci"),
    ("côte d'ivoire", "ci"),
    ("egypt", "eg"),
    ("australia", "au"),
    ("chile", "cl"),
    ("colombia", "co"),
    ("ecuador", "ec"),
    ("paraguay", "py"),
    ("peru", "pe"),
    ("saudi arabia", "sa"),
    ("iran", "ir"),
    ("algeria", "dz"),
    ("tunisia", "tn"),
    ("greece", "gr"),
    ("romania", "ro"),
    ("bosnia and herzegovina", "ba"),
    ("wales", "gb-wls"),
    ("scotland", "gb-sct"),
    ("northern ireland", "gb-nir"),
];

/// Case- and whitespace-insensitive lookup. Unmapped names return `None` and the
/// caller shows a text placeholder instead of a flag.
pub fn nationality_code(nationality: &str) -> Option<&'static str> {
    let needle = nationality.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    NATIONALITY_CODES
        .iter()
        .find(|(name, _)| *name == needle)
        .map(|(_, code)| *code)
}

pub fn flag_url(cdn_base: &str, code: &str) -> String {
    format!("{}/{code}.svg", cdn_base.trim_end_matches('/'))
}

/// Flag URL for a nationality, if it maps to a known code.
pub fn flag_url_for(cdn_base: &str, nationality: &str) -> Option<String> {
    nationality_code(nationality).map(|code| flag_url(cdn_base, code))
}
