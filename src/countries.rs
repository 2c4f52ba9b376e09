// Country picker data for the profile step of onboarding.

pub static ALL_COUNTRIES: &[(&str, &str)] = &[
    ("AF", "Afghanistan"),
    ("AL", "Albania"),
    ("DZ", "Algeria"),
    ("AD", "Andorra"),
    ("AO", "Angola"),
    ("AR", "Argentina"),
    ("AM", "Armenia"),
    ("AU", "Australia"),
    ("AT", "Austria"),
    ("AZ", "Azerbaijan"),
    ("BH", "Bahrain"),
    ("BD", "Bangladesh"),
    ("BY", "Belarus"),
    ("BE", "Belgium"),
    ("BZ", "Belize"),
    ("BJ", "Benin"),
    ("BO", "Bolivia"),
    ("BR", "Brazil"),
    ("BG", "Bulgaria"),
    ("KH", "Cambodia"),
    ("CM", "Cameroon"),
    ("CA", "Canada"),
    ("CL", "Chile"),
    ("CN", "China"),
    ("CO", "Colombia"),
    ("CR", "Costa Rica"),
    ("HR", "Croatia"),
    ("CY", "Cyprus"),
    ("CZ", "Czech Republic"),
    ("DK", "Denmark"),
    ("EG", "Egypt"),
    ("EE", "Estonia"),
    ("FI", "Finland"),
    ("FR", "France"),
    ("GA", "Gabon"),
    ("DE", "Germany"),
    ("GH", "Ghana"),
    ("GR", "Greece"),
    ("HK", "Hong Kong"),
    ("HU", "Hungary"),
    ("IS", "Iceland"),
    ("IN", "India"),
    ("ID", "Indonesia"),
    ("IR", "Iran"),
    ("IQ", "Iraq"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IT", "Italy"),
    ("JM", "Jamaica"),
    ("JP", "Japan"),
    ("JO", "Jordan"),
    ("KZ", "Kazakhstan"),
    ("KE", "Kenya"),
    ("KR", "Korea"),
    ("KW", "Kuwait"),
    ("LB", "Lebanon"),
    ("LY", "Libya"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("MG", "Madagascar"),
    ("MW", "Malawi"),
    ("MY", "Malaysia"),
    ("ML", "Mali"),
    ("MX", "Mexico"),
    ("MA", "Morocco"),
    ("MZ", "Mozambique"),
    ("NP", "Nepal"),
    ("NL", "Netherlands"),
    ("NZ", "New Zealand"),
    ("NG", "Nigeria"),
    ("NO", "Norway"),
    ("OM", "Oman"),
    ("PK", "Pakistan"),
    ("PH", "Philippines"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("QA", "Qatar"),
    ("RO", "Romania"),
    ("RU", "Russia"),
    ("SA", "Saudi Arabia"),
    ("SN", "Senegal"),
    ("SG", "Singapore"),
    ("ZA", "South Africa"),
    ("ES", "Spain"),
    ("SE", "Sweden"),
    ("CH", "Switzerland"),
    ("TZ", "Tanzania"),
    ("TH", "Thailand"),
    ("TN", "Tunisia"),
    ("TR", "Türkiye"),
    ("UG", "Uganda"),
    ("UA", "Ukraine"),
    ("AE", "United Arab Emirates"),
    ("GB", "United Kingdom"),
    ("US", "United States"),
    ("VN", "Vietnam"),
    ("ZM", "Zambia"),
    ("ZW", "Zimbabwe"),
];

pub fn name_of(code: &str) -> Option<&'static str> {
    ALL_COUNTRIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Regional-indicator flag for a two-letter code, empty for anything else.
pub fn flag_emoji(code: &str) -> String {
    let code = code.trim();
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return String::new();
    }
    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

/// Case-insensitive substring match on the country name.
pub fn search(query: &str) -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    let needle = query.trim().to_lowercase();
    ALL_COUNTRIES
        .iter()
        .filter(move |(_, name)| needle.is_empty() || name.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_from_codes() {
        assert_eq!(flag_emoji("NG"), "🇳🇬");
        assert_eq!(flag_emoji("us"), "🇺🇸");
        assert_eq!(flag_emoji("USA"), "");
        assert_eq!(flag_emoji(""), "");
    }

    #[test]
    fn search_is_case_insensitive() {
        let hits: Vec<_> = search("NIGER").map(|(c, _)| *c).collect();
        assert_eq!(hits, vec!["NG"]);
        assert_eq!(search(" LAND ").count(), search("land").count());
        assert!(search("land").any(|(c, _)| *c == "FI"));
        assert_eq!(search("").count(), ALL_COUNTRIES.len());
        assert_eq!(search("zzzz").count(), 0);
    }

    #[test]
    fn codes_are_unique_two_letter() {
        let mut codes: Vec<_> = ALL_COUNTRIES.iter().map(|(c, _)| *c).collect();
        assert!(codes.iter().all(|c| c.len() == 2));
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), ALL_COUNTRIES.len());
    }

    #[test]
    fn lookup_by_code() {
        assert_eq!(name_of("gh"), Some("Ghana"));
        assert_eq!(name_of("XX"), None);
    }
}
