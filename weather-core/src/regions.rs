//! US states and ISO 3166-1 countries with their codes, for the `--state`
//! and `--country` search fields.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub code: &'static str,
}

const fn region(name: &'static str, code: &'static str) -> Region {
    Region { name, code }
}

pub const US_STATES: &[Region] = &[
    region("Alabama", "AL"),
    region("Alaska", "AK"),
    region("Arizona", "AZ"),
    region("Arkansas", "AR"),
    region("California", "CA"),
    region("Colorado", "CO"),
    region("Connecticut", "CT"),
    region("Delaware", "DE"),
    region("Florida", "FL"),
    region("Georgia", "GA"),
    region("Hawaii", "HI"),
    region("Idaho", "ID"),
    region("Illinois", "IL"),
    region("Indiana", "IN"),
    region("Iowa", "IA"),
    region("Kansas", "KS"),
    region("Kentucky", "KY"),
    region("Louisiana", "LA"),
    region("Maine", "ME"),
    region("Maryland", "MD"),
    region("Massachusetts", "MA"),
    region("Michigan", "MI"),
    region("Minnesota", "MN"),
    region("Mississippi", "MS"),
    region("Missouri", "MO"),
    region("Montana", "MT"),
    region("Nebraska", "NE"),
    region("Nevada", "NV"),
    region("New Hampshire", "NH"),
    region("New Jersey", "NJ"),
    region("New Mexico", "NM"),
    region("New York", "NY"),
    region("North Carolina", "NC"),
    region("North Dakota", "ND"),
    region("Ohio", "OH"),
    region("Oklahoma", "OK"),
    region("Oregon", "OR"),
    region("Pennsylvania", "PA"),
    region("Rhode Island", "RI"),
    region("South Carolina", "SC"),
    region("South Dakota", "SD"),
    region("Tennessee", "TN"),
    region("Texas", "TX"),
    region("Utah", "UT"),
    region("Vermont", "VT"),
    region("Virginia", "VA"),
    region("Washington", "WA"),
    region("West Virginia", "WV"),
    region("Wisconsin", "WI"),
    region("Wyoming", "WY"),
];

/// ISO 3166-1 alpha-2 codes with their common English names.
pub const COUNTRIES: &[Region] = &[
    region("Afghanistan", "AF"),
    region("Albania", "AL"),
    region("Algeria", "DZ"),
    region("American Samoa", "AS"),
    region("Andorra", "AD"),
    region("Angola", "AO"),
    region("Anguilla", "AI"),
    region("Antarctica", "AQ"),
    region("Antigua and Barbuda", "AG"),
    region("Argentina", "AR"),
    region("Armenia", "AM"),
    region("Aruba", "AW"),
    region("Australia", "AU"),
    region("Austria", "AT"),
    region("Azerbaijan", "AZ"),
    region("Bahamas", "BS"),
    region("Bahrain", "BH"),
    region("Bangladesh", "BD"),
    region("Barbados", "BB"),
    region("Belarus", "BY"),
    region("Belgium", "BE"),
    region("Belize", "BZ"),
    region("Benin", "BJ"),
    region("Bermuda", "BM"),
    region("Bhutan", "BT"),
    region("Bolivia", "BO"),
    region("Bonaire, Sint Eustatius and Saba", "BQ"),
    region("Bosnia and Herzegovina", "BA"),
    region("Botswana", "BW"),
    region("Bouvet Island", "BV"),
    region("Brazil", "BR"),
    region("British Indian Ocean Territory", "IO"),
    region("Brunei Darussalam", "BN"),
    region("Bulgaria", "BG"),
    region("Burkina Faso", "BF"),
    region("Burundi", "BI"),
    region("Cabo Verde", "CV"),
    region("Cambodia", "KH"),
    region("Cameroon", "CM"),
    region("Canada", "CA"),
    region("Cayman Islands", "KY"),
    region("Central African Republic", "CF"),
    region("Chad", "TD"),
    region("Chile", "CL"),
    region("China", "CN"),
    region("Christmas Island", "CX"),
    region("Cocos (Keeling) Islands", "CC"),
    region("Colombia", "CO"),
    region("Comoros", "KM"),
    region("Congo", "CG"),
    region("Congo, The Democratic Republic of the", "CD"),
    region("Cook Islands", "CK"),
    region("Costa Rica", "CR"),
    region("Croatia", "HR"),
    region("Cuba", "CU"),
    region("Curaçao", "CW"),
    region("Cyprus", "CY"),
    region("Czechia", "CZ"),
    region("Côte d'Ivoire", "CI"),
    region("Denmark", "DK"),
    region("Djibouti", "DJ"),
    region("Dominica", "DM"),
    region("Dominican Republic", "DO"),
    region("Ecuador", "EC"),
    region("Egypt", "EG"),
    region("El Salvador", "SV"),
    region("Equatorial Guinea", "GQ"),
    region("Eritrea", "ER"),
    region("Estonia", "EE"),
    region("Eswatini", "SZ"),
    region("Ethiopia", "ET"),
    region("Falkland Islands (Malvinas)", "FK"),
    region("Faroe Islands", "FO"),
    region("Fiji", "FJ"),
    region("Finland", "FI"),
    region("France", "FR"),
    region("French Guiana", "GF"),
    region("French Polynesia", "PF"),
    region("French Southern Territories", "TF"),
    region("Gabon", "GA"),
    region("Gambia", "GM"),
    region("Georgia", "GE"),
    region("Germany", "DE"),
    region("Ghana", "GH"),
    region("Gibraltar", "GI"),
    region("Greece", "GR"),
    region("Greenland", "GL"),
    region("Grenada", "GD"),
    region("Guadeloupe", "GP"),
    region("Guam", "GU"),
    region("Guatemala", "GT"),
    region("Guernsey", "GG"),
    region("Guinea", "GN"),
    region("Guinea-Bissau", "GW"),
    region("Guyana", "GY"),
    region("Haiti", "HT"),
    region("Heard Island and McDonald Islands", "HM"),
    region("Holy See (Vatican City State)", "VA"),
    region("Honduras", "HN"),
    region("Hong Kong", "HK"),
    region("Hungary", "HU"),
    region("Iceland", "IS"),
    region("India", "IN"),
    region("Indonesia", "ID"),
    region("Iran", "IR"),
    region("Iraq", "IQ"),
    region("Ireland", "IE"),
    region("Isle of Man", "IM"),
    region("Israel", "IL"),
    region("Italy", "IT"),
    region("Jamaica", "JM"),
    region("Japan", "JP"),
    region("Jersey", "JE"),
    region("Jordan", "JO"),
    region("Kazakhstan", "KZ"),
    region("Kenya", "KE"),
    region("Kiribati", "KI"),
    region("Kuwait", "KW"),
    region("Kyrgyzstan", "KG"),
    region("Laos", "LA"),
    region("Latvia", "LV"),
    region("Lebanon", "LB"),
    region("Lesotho", "LS"),
    region("Liberia", "LR"),
    region("Libya", "LY"),
    region("Liechtenstein", "LI"),
    region("Lithuania", "LT"),
    region("Luxembourg", "LU"),
    region("Macao", "MO"),
    region("Madagascar", "MG"),
    region("Malawi", "MW"),
    region("Malaysia", "MY"),
    region("Maldives", "MV"),
    region("Mali", "ML"),
    region("Malta", "MT"),
    region("Marshall Islands", "MH"),
    region("Martinique", "MQ"),
    region("Mauritania", "MR"),
    region("Mauritius", "MU"),
    region("Mayotte", "YT"),
    region("Mexico", "MX"),
    region("Micronesia, Federated States of", "FM"),
    region("Moldova", "MD"),
    region("Monaco", "MC"),
    region("Mongolia", "MN"),
    region("Montenegro", "ME"),
    region("Montserrat", "MS"),
    region("Morocco", "MA"),
    region("Mozambique", "MZ"),
    region("Myanmar", "MM"),
    region("Namibia", "NA"),
    region("Nauru", "NR"),
    region("Nepal", "NP"),
    region("Netherlands", "NL"),
    region("New Caledonia", "NC"),
    region("New Zealand", "NZ"),
    region("Nicaragua", "NI"),
    region("Niger", "NE"),
    region("Nigeria", "NG"),
    region("Niue", "NU"),
    region("Norfolk Island", "NF"),
    region("North Korea", "KP"),
    region("North Macedonia", "MK"),
    region("Northern Mariana Islands", "MP"),
    region("Norway", "NO"),
    region("Oman", "OM"),
    region("Pakistan", "PK"),
    region("Palau", "PW"),
    region("Palestine, State of", "PS"),
    region("Panama", "PA"),
    region("Papua New Guinea", "PG"),
    region("Paraguay", "PY"),
    region("Peru", "PE"),
    region("Philippines", "PH"),
    region("Pitcairn", "PN"),
    region("Poland", "PL"),
    region("Portugal", "PT"),
    region("Puerto Rico", "PR"),
    region("Qatar", "QA"),
    region("Romania", "RO"),
    region("Russian Federation", "RU"),
    region("Rwanda", "RW"),
    region("Réunion", "RE"),
    region("Saint Barthélemy", "BL"),
    region("Saint Helena, Ascension and Tristan da Cunha", "SH"),
    region("Saint Kitts and Nevis", "KN"),
    region("Saint Lucia", "LC"),
    region("Saint Martin (French part)", "MF"),
    region("Saint Pierre and Miquelon", "PM"),
    region("Saint Vincent and the Grenadines", "VC"),
    region("Samoa", "WS"),
    region("San Marino", "SM"),
    region("Sao Tome and Principe", "ST"),
    region("Saudi Arabia", "SA"),
    region("Senegal", "SN"),
    region("Serbia", "RS"),
    region("Seychelles", "SC"),
    region("Sierra Leone", "SL"),
    region("Singapore", "SG"),
    region("Sint Maarten (Dutch part)", "SX"),
    region("Slovakia", "SK"),
    region("Slovenia", "SI"),
    region("Solomon Islands", "SB"),
    region("Somalia", "SO"),
    region("South Africa", "ZA"),
    region("South Georgia and the South Sandwich Islands", "GS"),
    region("South Korea", "KR"),
    region("South Sudan", "SS"),
    region("Spain", "ES"),
    region("Sri Lanka", "LK"),
    region("Sudan", "SD"),
    region("Suriname", "SR"),
    region("Svalbard and Jan Mayen", "SJ"),
    region("Sweden", "SE"),
    region("Switzerland", "CH"),
    region("Syria", "SY"),
    region("Taiwan", "TW"),
    region("Tajikistan", "TJ"),
    region("Tanzania", "TZ"),
    region("Thailand", "TH"),
    region("Timor-Leste", "TL"),
    region("Togo", "TG"),
    region("Tokelau", "TK"),
    region("Tonga", "TO"),
    region("Trinidad and Tobago", "TT"),
    region("Tunisia", "TN"),
    region("Turkmenistan", "TM"),
    region("Turks and Caicos Islands", "TC"),
    region("Tuvalu", "TV"),
    region("Türkiye", "TR"),
    region("Uganda", "UG"),
    region("Ukraine", "UA"),
    region("United Arab Emirates", "AE"),
    region("United Kingdom", "GB"),
    region("United States", "US"),
    region("United States Minor Outlying Islands", "UM"),
    region("Uruguay", "UY"),
    region("Uzbekistan", "UZ"),
    region("Vanuatu", "VU"),
    region("Venezuela", "VE"),
    region("Vietnam", "VN"),
    region("Virgin Islands, British", "VG"),
    region("Virgin Islands, U.S.", "VI"),
    region("Wallis and Futuna", "WF"),
    region("Western Sahara", "EH"),
    region("Yemen", "YE"),
    region("Zambia", "ZM"),
    region("Zimbabwe", "ZW"),
    region("Åland Islands", "AX"),
];

pub fn find_us_state(name_or_code: &str) -> Option<&'static Region> {
    let needle = name_or_code.trim();
    US_STATES
        .iter()
        .find(|r| r.code.eq_ignore_ascii_case(needle) || r.name.eq_ignore_ascii_case(needle))
}

/// Normalize user input for the state field: known states map to their code,
/// anything else is passed on uppercased.
pub fn normalize_state_code(input: &str) -> String {
    match find_us_state(input) {
        Some(r) => r.code.to_string(),
        None => input.trim().to_uppercase(),
    }
}

pub fn find_country(name_or_code: &str) -> Option<&'static Region> {
    let needle = name_or_code.trim();
    COUNTRIES
        .iter()
        .find(|r| r.code.eq_ignore_ascii_case(needle) || r.name.eq_ignore_ascii_case(needle))
}

/// Known countries map to their code, anything else is passed on uppercased.
pub fn normalize_country_code(input: &str) -> String {
    match find_country(input) {
        Some(r) => r.code.to_string(),
        None => input.trim().to_uppercase(),
    }
}

/// State and country codes for a search. A recognised US state with no
/// country means the United States; otherwise OpenWeather would read the
/// state code as a country.
pub fn search_codes(
    state: Option<&str>,
    country: Option<&str>,
) -> (Option<String>, Option<String>) {
    let state = state.map(normalize_state_code);
    let country = country.map(normalize_country_code).filter(|c| !c.is_empty());

    let country = match (&state, country) {
        (_, Some(country)) => Some(country),
        (Some(s), None) if find_us_state(s).is_some() => Some("US".to_string()),
        (_, None) => None,
    };

    (state, country)
}
