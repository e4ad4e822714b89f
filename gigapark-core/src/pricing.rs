use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use gigapark_shared::Ticket;

/// Pluggable pricing function, evaluated once when a ticket is closed
pub trait Tariff: Send + Sync {
    /// Cost in minor currency units for leaving at `exit_time`
    fn cost_cents(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> i64;
}

impl<F> Tariff for F
where
    F: Fn(&Ticket, DateTime<Utc>) -> i64 + Send + Sync,
{
    fn cost_cents(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> i64 {
        self(ticket, exit_time)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Price per started hour (in cents)
    pub cents_per_hour: i64,

    /// Stays up to this long are free
    #[serde(default)]
    pub grace_minutes: i64,

    /// Upper bound per started day, `None` for uncapped
    #[serde(default)]
    pub daily_cap_cents: Option<i64>,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            cents_per_hour: 200,
            grace_minutes: 15,
            daily_cap_cents: Some(2000),
        }
    }
}

/// Hourly tariff: permanent parkers ride free, everyone else pays per
/// started hour after the grace period, capped per day.
pub struct HourlyTariff {
    config: TariffConfig,
}

impl HourlyTariff {
    pub fn new(config: TariffConfig) -> Self {
        Self { config }
    }

    fn charge_for_hours(&self, hours: i64) -> i64 {
        let charge = hours * self.config.cents_per_hour;
        match self.config.daily_cap_cents {
            Some(cap) => charge.min(cap),
            None => charge,
        }
    }
}

impl Default for HourlyTariff {
    fn default() -> Self {
        Self::new(TariffConfig::default())
    }
}

impl Tariff for HourlyTariff {
    fn cost_cents(&self, ticket: &Ticket, exit_time: DateTime<Utc>) -> i64 {
        if ticket.is_permanent {
            return 0;
        }

        let minutes = (exit_time - ticket.entry_time).num_minutes().max(0);
        if minutes <= self.config.grace_minutes {
            return 0;
        }

        let started_hours = (minutes + 59) / 60;
        let full_days = started_hours / 24;
        let remaining_hours = started_hours % 24;

        full_days * self.charge_for_hours(24) + self.charge_for_hours(remaining_hours)
    }
}

/// Formats cents as `12.34`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{}{}.{:02}", sign, cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ticket(is_permanent: bool, entry: DateTime<Utc>) -> Ticket {
        Ticket::issue(1, "AB-123".to_string(), is_permanent, 0, entry)
    }

    #[test]
    fn test_permanent_parkers_pay_nothing() {
        let tariff = HourlyTariff::default();
        let entry = Utc::now();

        assert_eq!(tariff.cost_cents(&ticket(true, entry), entry + Duration::hours(30)), 0);
    }

    #[test]
    fn test_hourly_charges() {
        let tariff = HourlyTariff::default();
        let entry = Utc::now();
        let t = ticket(false, entry);

        // Inside grace period
        assert_eq!(tariff.cost_cents(&t, entry + Duration::minutes(15)), 0);
        // Started hours
        assert_eq!(tariff.cost_cents(&t, entry + Duration::minutes(16)), 200);
        assert_eq!(tariff.cost_cents(&t, entry + Duration::minutes(61)), 400);
        // Daily cap (20.00), then a fresh day
        assert_eq!(tariff.cost_cents(&t, entry + Duration::hours(23)), 2000);
        assert_eq!(tariff.cost_cents(&t, entry + Duration::hours(25)), 2200);
    }

    #[test]
    fn test_uncapped_tariff() {
        let tariff = HourlyTariff::new(TariffConfig {
            cents_per_hour: 100,
            grace_minutes: 0,
            daily_cap_cents: None,
        });
        let entry = Utc::now();

        assert_eq!(tariff.cost_cents(&ticket(false, entry), entry + Duration::hours(26)), 2600);
    }

    #[test]
    fn test_exit_before_entry_is_free() {
        let tariff = HourlyTariff::default();
        let entry = Utc::now();

        assert_eq!(tariff.cost_cents(&ticket(false, entry), entry - Duration::hours(2)), 0);
    }

    #[test]
    fn test_closure_tariff() {
        let flat = |_: &Ticket, _: DateTime<Utc>| -> i64 { 500 };
        let entry = Utc::now();

        assert_eq!(flat.cost_cents(&ticket(false, entry), entry), 500);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(205), "2.05");
        assert_eq!(format_cents(-150), "-1.50");
    }
}
