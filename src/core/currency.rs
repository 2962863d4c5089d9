//! Supported display currencies

pub struct CurrencyInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

const fn info(code: &'static str, name: &'static str, symbol: &'static str) -> CurrencyInfo {
    CurrencyInfo { code, name, symbol }
}

/// Display currencies offered to users, base currency first.
pub const SUPPORTED_CURRENCIES: &[CurrencyInfo] = &[
    info("EUR", "Euro", "€"),
    info("USD", "US Dollar", "$"),
    info("GBP", "British Pound", "£"),
    info("CAD", "Canadian Dollar", "C$"),
    info("AUD", "Australian Dollar", "A$"),
    info("JPY", "Japanese Yen", "¥"),
    info("CHF", "Swiss Franc", "CHF"),
    info("CNY", "Chinese Yuan", "¥"),
    info("INR", "Indian Rupee", "₹"),
    info("SEK", "Swedish Krona", "kr"),
    info("NOK", "Norwegian Krone", "kr"),
    info("DKK", "Danish Krone", "kr"),
    info("PLN", "Polish Zloty", "zł"),
    info("CZK", "Czech Koruna", "Kč"),
    info("HUF", "Hungarian Forint", "Ft"),
    info("BGN", "Bulgarian Lev", "лв"),
    info("RON", "Romanian Leu", "lei"),
    info("HRK", "Croatian Kuna", "kn"),
    info("RUB", "Russian Ruble", "₽"),
    info("TRY", "Turkish Lira", "₺"),
    info("BRL", "Brazilian Real", "R$"),
    info("MXN", "Mexican Peso", "$"),
    info("SGD", "Singapore Dollar", "S$"),
    info("HKD", "Hong Kong Dollar", "HK$"),
    info("KRW", "South Korean Won", "₩"),
    info("ZAR", "South African Rand", "R"),
    info("NZD", "New Zealand Dollar", "NZ$"),
    info("THB", "Thai Baht", "฿"),
    info("MYR", "Malaysian Ringgit", "RM"),
    info("PHP", "Philippine Peso", "₱"),
    info("IDR", "Indonesian Rupiah", "Rp"),
    info("VND", "Vietnamese Dong", "₫"),
];

pub fn lookup(code: &str) -> Option<&'static CurrencyInfo> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
}

pub fn is_supported(code: &str) -> bool {
    lookup(code).is_some()
}

/// Symbol for display, or the code itself for unknown currencies.
pub fn symbol_for(code: &str) -> &str {
    lookup(code).map_or(code, |c| c.symbol)
}
