use crate::structs::{OutreachMethod, WeatherLabel};

/// Average above which a sunny day warrants a text message (exclusive).
pub const WARM_THRESHOLD: i64 = 75;

/// Average below which a phone call is preferred (exclusive).
pub const COLD_THRESHOLD: i64 = 55;

/// Maps a day's average temperature and weather outlook to an outreach method.
///
/// Rules are evaluated top to bottom and the first match wins:
///
/// 1. warmer than 75 and sunny: text message
/// 2. colder than 55, or rainy: phone call
/// 3. strictly between 55 and 75: email
///
/// Anything else, such as exactly 55 or 75 on a day that is neither sunny nor
/// rainy, yields `OutreachMethod::Unknown` rather than a guess.
///
/// # Arguments
///
/// * `average_temperature` - Truncated daily average in the forecast unit
/// * `weather` - Outlook derived from the day's condition labels
pub fn classify(average_temperature: i64, weather: WeatherLabel) -> OutreachMethod {
    if average_temperature > WARM_THRESHOLD && weather == WeatherLabel::Sunny {
        OutreachMethod::TextMessage
    } else if average_temperature < COLD_THRESHOLD || weather == WeatherLabel::Rainy {
        OutreachMethod::PhoneCall
    } else if average_temperature > COLD_THRESHOLD && average_temperature < WARM_THRESHOLD {
        OutreachMethod::Email
    } else {
        OutreachMethod::Unknown
    }
}
