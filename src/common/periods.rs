// src/common/periods.rs

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Janela de agregação usada nos resumos de jam kerja e gaji.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Periode {
    Hari,
    Minggu,
    Bulan,
    #[default]
    Total,
}

impl Periode {
    /// Primeiro dia (inclusive) da janela; `None` = desde sempre.
    pub fn start_date(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Periode::Hari => Some(today),
            // Semana começa na segunda-feira
            Periode::Minggu => {
                Some(today - Duration::days(today.weekday().num_days_from_monday() as i64))
            }
            Periode::Bulan => today.with_day(1),
            Periode::Total => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Periode::Hari => "hari",
            Periode::Minggu => "minggu",
            Periode::Bulan => "bulan",
            Periode::Total => "total",
        }
    }
}

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn local_date_of(ts: DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Meia-noite local de `date`, convertida para UTC.
pub fn local_midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-16 é uma sexta-feira
        assert_eq!(Periode::Minggu.start_date(date(2026, 10, 16)), Some(date(2026, 10, 12)));
        // Segunda-feira é o próprio início
        assert_eq!(Periode::Minggu.start_date(date(2026, 10, 12)), Some(date(2026, 10, 12)));
        // Domingo pertence à semana iniciada seis dias antes
        assert_eq!(Periode::Minggu.start_date(date(2026, 10, 18)), Some(date(2026, 10, 12)));
    }

    #[test]
    fn month_and_day_windows() {
        assert_eq!(Periode::Bulan.start_date(date(2026, 2, 28)), Some(date(2026, 2, 1)));
        assert_eq!(Periode::Hari.start_date(date(2026, 2, 28)), Some(date(2026, 2, 28)));
        assert_eq!(Periode::Total.start_date(date(2026, 2, 28)), None);
    }

    #[test]
    fn periode_parses_from_query_strings() {
        let p: Periode = serde_json::from_str("\"minggu\"").unwrap();
        assert_eq!(p, Periode::Minggu);
        assert_eq!(Periode::default(), Periode::Total);
        assert!(serde_json::from_str::<Periode>("\"tahun\"").is_err());
    }
}
