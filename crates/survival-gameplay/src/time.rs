//! Continuous game clock and day/night cycle.
//!
//! Game time is derived from the wall clock, so it keeps running while the
//! process is not:
//! - Real epoch 2025-01-01 00:00 UTC maps to game epoch 2125-01-01 00:00 UTC
//! - Game time runs 1.2x real time (one game day every 20 real hours)
//! - Daylight length follows the season, light intensity follows sunrise and
//!   sunset
//!
//! Every accessor has an `*_at(now)` variant taking the real instant; the
//! plain accessors use [`Utc::now`].

use std::time::Duration;

use chrono::{DateTime, Datelike, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 2025-01-01 00:00:00 UTC.
const REAL_EPOCH_SECS: i64 = 1_735_689_600;
/// 2125-01-01 00:00:00 UTC.
const GAME_EPOCH_SECS: i64 = 4_891_363_200;

/// Game seconds per real second.
pub const TIME_RATIO: f64 = 24.0 / 20.0;
/// [`TIME_RATIO`] as an exact fraction.
const RATIO_NUM: i64 = 6;
const RATIO_DEN: i64 = 5;

/// Mean daylight length in hours.
pub const AVERAGE_DAYLIGHT_HOURS: f64 = 14.0;
/// Seasonal swing around the mean, in hours.
pub const DAYLIGHT_AMPLITUDE_HOURS: f64 = 4.0;
/// Day of year with the longest daylight.
pub const SUMMER_SOLSTICE_DAY: u32 = 172;
/// Days per seasonal cycle.
const DAYS_PER_YEAR: f64 = 365.0;
/// Hour of solar noon.
const SOLAR_NOON: f64 = 12.0;

/// Light intensity at night.
pub const NIGHT_LIGHT: f32 = 0.15;
/// Light intensity during the day.
pub const DAY_LIGHT: f32 = 1.0;
/// Length of the sunrise and sunset ramps, in hours.
pub const LIGHT_TRANSITION_HOURS: f64 = 1.0;

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Real instant at which the game clock reads [`game_epoch`].
#[must_use]
pub fn real_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(REAL_EPOCH_SECS, 0).unwrap_or_default()
}

/// First instant of game day 1.
#[must_use]
pub fn game_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(GAME_EPOCH_SECS, 0).unwrap_or_default()
}

/// Maps a real instant to the game clock.
#[must_use]
pub fn game_time_at(now: DateTime<Utc>) -> DateTime<Utc> {
    let real_ms = (now - real_epoch()).num_milliseconds();
    let game_ms = real_ms.saturating_mul(RATIO_NUM) / RATIO_DEN;
    TimeDelta::try_milliseconds(game_ms)
        .and_then(|elapsed| game_epoch().checked_add_signed(elapsed))
        .unwrap_or(if game_ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Maps a game instant back to the real instant showing it.
#[must_use]
pub fn real_time_for(game_time: DateTime<Utc>) -> DateTime<Utc> {
    let game_ms = (game_time - game_epoch()).num_milliseconds();
    let real_ms = game_ms.saturating_mul(RATIO_DEN) / RATIO_NUM;
    TimeDelta::try_milliseconds(real_ms)
        .and_then(|elapsed| real_epoch().checked_add_signed(elapsed))
        .unwrap_or(if real_ms < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Converts a game duration to the real duration it takes.
#[must_use]
pub fn game_to_real_duration(game: Duration) -> Duration {
    scale_duration(game, RATIO_DEN, RATIO_NUM)
}

/// Converts a real duration to the game duration it covers.
#[must_use]
pub fn real_to_game_duration(real: Duration) -> Duration {
    scale_duration(real, RATIO_NUM, RATIO_DEN)
}

fn scale_duration(duration: Duration, num: i64, den: i64) -> Duration {
    let nanos = duration.as_nanos() * num as u128 / den as u128;
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % 1_000_000_000) as u32)
}

/// Real seconds per game hour (3000).
#[must_use]
pub fn seconds_per_game_hour() -> f64 {
    SECONDS_PER_HOUR / TIME_RATIO
}

/// Real seconds per game day (72000).
#[must_use]
pub fn seconds_per_game_day() -> f64 {
    SECONDS_PER_DAY / TIME_RATIO
}

/// Daylight length in hours for a day of the year.
///
/// 18 hours at the summer solstice, 10 hours half a year later.
#[must_use]
pub fn daylight_hours_for_day(day_of_year: u32) -> f64 {
    let phase = std::f64::consts::TAU * (f64::from(day_of_year) - f64::from(SUMMER_SOLSTICE_DAY))
        / DAYS_PER_YEAR;
    AVERAGE_DAYLIGHT_HOURS + DAYLIGHT_AMPLITUDE_HOURS * phase.cos()
}

/// Hour of sunrise for a day of the year.
#[must_use]
pub fn sunrise_hour_for_day(day_of_year: u32) -> f64 {
    SOLAR_NOON - daylight_hours_for_day(day_of_year) / 2.0
}

/// Hour of sunset for a day of the year.
#[must_use]
pub fn sunset_hour_for_day(day_of_year: u32) -> f64 {
    SOLAR_NOON + daylight_hours_for_day(day_of_year) / 2.0
}

/// Ambient light at a game instant, in `[NIGHT_LIGHT, DAY_LIGHT]`.
///
/// Ramps linearly over [`LIGHT_TRANSITION_HOURS`] centred on sunrise and on
/// sunset.
#[must_use]
pub fn light_intensity_for(game_time: DateTime<Utc>) -> f32 {
    let day = game_time.ordinal();
    let sunrise = sunrise_hour_for_day(day);
    let sunset = sunset_hour_for_day(day);
    let hour = fractional_hour(game_time);
    let half = LIGHT_TRANSITION_HOURS / 2.0;

    let daylight = if hour <= sunrise - half || hour >= sunset + half {
        0.0
    } else if hour < sunrise + half {
        (hour - (sunrise - half)) / LIGHT_TRANSITION_HOURS
    } else if hour > sunset - half {
        ((sunset + half) - hour) / LIGHT_TRANSITION_HOURS
    } else {
        1.0
    };

    let light = NIGHT_LIGHT + (DAY_LIGHT - NIGHT_LIGHT) * daylight as f32;
    light.clamp(NIGHT_LIGHT, DAY_LIGHT)
}

fn fractional_hour(time: DateTime<Utc>) -> f64 {
    f64::from(time.hour())
        + f64::from(time.minute()) / 60.0
        + f64::from(time.second()) / 3600.0
        + f64::from(time.nanosecond()) / 3.6e12
}

/// Period of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// 00:00 - 05:00
    Night,
    /// 05:00 - 07:00
    Dawn,
    /// 07:00 - 12:00
    Morning,
    /// 12:00 - 17:00
    Afternoon,
    /// 17:00 - 19:00
    Dusk,
    /// 19:00 - 24:00
    Evening,
}

impl TimeOfDay {
    /// Period containing the given hour. Hours past 23 count as night.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            5..=6 => Self::Dawn,
            7..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=18 => Self::Dusk,
            19..=23 => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Get the display name of this period.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::Dawn => "Dawn",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Dusk => "Dusk",
            Self::Evening => "Evening",
        }
    }

    /// Dawn, morning and afternoon.
    #[must_use]
    pub const fn is_day(self) -> bool {
        matches!(self, Self::Dawn | Self::Morning | Self::Afternoon)
    }

    /// Night and evening.
    #[must_use]
    pub const fn is_night(self) -> bool {
        matches!(self, Self::Night | Self::Evening)
    }

    /// Dawn and dusk.
    #[must_use]
    pub const fn is_twilight(self) -> bool {
        matches!(self, Self::Dawn | Self::Dusk)
    }
}

/// A change observed by [`TimeManager::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeTransition {
    /// The hour changed to the given value.
    HourChanged(u32),
    /// The day number changed to the given value.
    DayChanged(i64),
    /// The period of the day changed.
    TimeOfDayChanged(TimeOfDay),
}

impl TimeTransition {
    /// Get a description of this transition.
    #[must_use]
    pub fn description(self) -> String {
        match self {
            Self::HourChanged(h) => format!("It's {h:02}:00"),
            Self::DayChanged(day) => format!("Day {day} has begun"),
            Self::TimeOfDayChanged(period) => period.display_name().to_string(),
        }
    }
}

/// Reads the continuous game clock and reports changes since the last poll.
///
/// Getters are pure functions of the current instant. Only [`Self::update`]
/// keeps state: the last observed hour, day and period.
#[derive(Debug, Clone)]
pub struct TimeManager {
    last_hour: u32,
    last_day: i64,
    last_time_of_day: TimeOfDay,
}

impl Default for TimeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeManager {
    /// Creates a manager observing the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    /// Creates a manager observing `now`.
    #[must_use]
    pub fn new_at(now: DateTime<Utc>) -> Self {
        let game = game_time_at(now);
        Self {
            last_hour: game.hour(),
            last_day: day_number(game),
            last_time_of_day: TimeOfDay::from_hour(game.hour()),
        }
    }

    /// Current game date and time.
    #[must_use]
    pub fn current_game_time(&self) -> DateTime<Utc> {
        game_time_at(Utc::now())
    }

    /// Day number, starting at 1 on 2125-01-01.
    #[must_use]
    pub fn current_day(&self) -> i64 {
        self.current_day_at(Utc::now())
    }

    /// Day number at `now`.
    #[must_use]
    pub fn current_day_at(&self, now: DateTime<Utc>) -> i64 {
        day_number(game_time_at(now))
    }

    /// Hour of the game day (0-23).
    #[must_use]
    pub fn current_hour(&self) -> u32 {
        self.current_hour_at(Utc::now())
    }

    /// Hour of the game day at `now`.
    #[must_use]
    pub fn current_hour_at(&self, now: DateTime<Utc>) -> u32 {
        game_time_at(now).hour()
    }

    /// Minute of the game hour (0-59).
    #[must_use]
    pub fn current_minute(&self) -> u32 {
        self.current_minute_at(Utc::now())
    }

    /// Minute of the game hour at `now`.
    #[must_use]
    pub fn current_minute_at(&self, now: DateTime<Utc>) -> u32 {
        game_time_at(now).minute()
    }

    /// Second of the game minute (0-59).
    #[must_use]
    pub fn current_second(&self) -> u32 {
        self.current_second_at(Utc::now())
    }

    /// Second of the game minute at `now`.
    #[must_use]
    pub fn current_second_at(&self, now: DateTime<Utc>) -> u32 {
        game_time_at(now).second()
    }

    /// Current period of the day.
    #[must_use]
    pub fn current_time_of_day(&self) -> TimeOfDay {
        self.current_time_of_day_at(Utc::now())
    }

    /// Period of the day at `now`.
    #[must_use]
    pub fn current_time_of_day_at(&self, now: DateTime<Utc>) -> TimeOfDay {
        TimeOfDay::from_hour(self.current_hour_at(now))
    }

    /// Whether it is dawn, morning or afternoon.
    #[must_use]
    pub fn is_day(&self) -> bool {
        self.current_time_of_day().is_day()
    }

    /// Whether it is night or evening.
    #[must_use]
    pub fn is_night(&self) -> bool {
        self.current_time_of_day().is_night()
    }

    /// Whether it is dawn or dusk.
    #[must_use]
    pub fn is_twilight(&self) -> bool {
        self.current_time_of_day().is_twilight()
    }

    /// Day of the game year (1-366).
    #[must_use]
    pub fn day_of_year(&self) -> u32 {
        self.day_of_year_at(Utc::now())
    }

    /// Day of the game year at `now`.
    #[must_use]
    pub fn day_of_year_at(&self, now: DateTime<Utc>) -> u32 {
        game_time_at(now).ordinal()
    }

    /// Hours of daylight today.
    #[must_use]
    pub fn daylight_hours(&self) -> f64 {
        daylight_hours_for_day(self.day_of_year())
    }

    /// Hour of sunrise today.
    #[must_use]
    pub fn sunrise_hour(&self) -> f64 {
        sunrise_hour_for_day(self.day_of_year())
    }

    /// Hour of sunset today.
    #[must_use]
    pub fn sunset_hour(&self) -> f64 {
        sunset_hour_for_day(self.day_of_year())
    }

    /// Current ambient light, in `[NIGHT_LIGHT, DAY_LIGHT]`.
    #[must_use]
    pub fn light_intensity(&self) -> f32 {
        self.light_intensity_at(Utc::now())
    }

    /// Ambient light at `now`.
    #[must_use]
    pub fn light_intensity_at(&self, now: DateTime<Utc>) -> f32 {
        light_intensity_for(game_time_at(now))
    }

    /// "Day N - HH:MM:SS".
    #[must_use]
    pub fn formatted_time(&self) -> String {
        self.formatted_time_at(Utc::now())
    }

    /// "Day N - HH:MM:SS" at `now`.
    #[must_use]
    pub fn formatted_time_at(&self, now: DateTime<Utc>) -> String {
        let game = game_time_at(now);
        format!(
            "Day {} - {:02}:{:02}:{:02}",
            day_number(game),
            game.hour(),
            game.minute(),
            game.second()
        )
    }

    /// "DD/MM/YYYY HH:MM:SS".
    #[must_use]
    pub fn formatted_date_time(&self) -> String {
        self.formatted_date_time_at(Utc::now())
    }

    /// "DD/MM/YYYY HH:MM:SS" at `now`.
    #[must_use]
    pub fn formatted_date_time_at(&self, now: DateTime<Utc>) -> String {
        game_time_at(now).format("%d/%m/%Y %H:%M:%S").to_string()
    }

    /// Polls the clock and returns what changed since the previous poll.
    ///
    /// Call at a regular cadence; each change is reported once.
    pub fn update(&mut self) -> Vec<TimeTransition> {
        self.update_at(Utc::now())
    }

    /// Polls the clock as of `now`.
    pub fn update_at(&mut self, now: DateTime<Utc>) -> Vec<TimeTransition> {
        let game = game_time_at(now);
        let hour = game.hour();
        let day = day_number(game);
        let time_of_day = TimeOfDay::from_hour(hour);

        let mut transitions = Vec::new();
        if hour != self.last_hour {
            self.last_hour = hour;
            transitions.push(TimeTransition::HourChanged(hour));
        }
        if day != self.last_day {
            self.last_day = day;
            transitions.push(TimeTransition::DayChanged(day));
        }
        if time_of_day != self.last_time_of_day {
            self.last_time_of_day = time_of_day;
            transitions.push(TimeTransition::TimeOfDayChanged(time_of_day));
        }

        if !transitions.is_empty() {
            debug!("Time transitions: {transitions:?}");
        }
        transitions
    }
}

fn day_number(game_time: DateTime<Utc>) -> i64 {
    (game_time - game_epoch()).num_days() + 1
}
