//! Weekly reminder task: every Monday at 11:00 (configured timezone), each
//! user gets an email with their per-expense detail listing.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

use crate::{Mailer, balances, user};

pub fn spawn_weekly_report(
    db: DatabaseConnection,
    mailer: Arc<Mailer>,
    tz: Tz,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = time_until_next_run(Utc::now(), tz);
            tracing::info!("next weekly report in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            if let Err(err) = send_weekly_reminders(&db, &mailer).await {
                tracing::error!("weekly report failed: {err}");
            }
        }
    })
}

/// Time until the next Monday 11:00 in `tz`, from the given instant.
fn time_until_next_run(now: DateTime<Utc>, tz: Tz) -> Duration {
    let local = now.with_timezone(&tz);
    let run_time = NaiveTime::from_hms_opt(11, 0, 0).unwrap_or(NaiveTime::MIN);

    for days in 0..=7 {
        let date = local.date_naive() + chrono::Days::new(days);
        if date.weekday() != Weekday::Mon {
            continue;
        }
        // `earliest` resolves DST gaps; a skipped 11:00 falls through to the
        // following week.
        if let Some(target) = tz.from_local_datetime(&date.and_time(run_time)).earliest()
            && target > local
        {
            return (target - local)
                .to_std()
                .unwrap_or(Duration::from_secs(60));
        }
    }

    Duration::from_secs(24 * 60 * 60)
}

async fn send_weekly_reminders(db: &DatabaseConnection, mailer: &Mailer) -> Result<(), DbErr> {
    let users = user::Entity::find().all(db).await?;

    for u in users {
        let listing = balances::user_expense_listing(db, u.user_id).await?;
        if listing.is_empty() {
            continue;
        }

        let mut body = String::from("Hello,\n\nHere's your weekly expense reminder:\n\n");
        for view in &listing {
            body.push_str(&format!("Expense Name: {}\n", view.name));
            body.push_str(&format!("Created At: {}\n", view.created_at));
            body.push_str(&format!(
                "Share Amount: {}\n",
                engine::MoneyCents::new(view.share_cents)
            ));
            body.push_str(&format!("Lender ID: {}\n", view.lender_id));
            body.push_str(&format!("Lender Name: {}\n", view.lender_name));
            body.push_str(&format!(
                "Total Expense: {}\n\n",
                engine::MoneyCents::new(view.total_cents)
            ));
        }

        mailer
            .deliver(db, &u.email, "Weekly Expense Reminder", &body)
            .await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midweek_waits_until_monday_eleven() {
        // Wednesday 2026-01-07 12:00 UTC -> Monday 2026-01-12 11:00 UTC.
        let now = Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap();
        let wait = time_until_next_run(now, chrono_tz::UTC);
        assert_eq!(wait, Duration::from_secs((4 * 24 + 23) * 3600));
    }

    #[test]
    fn monday_morning_waits_until_eleven_same_day() {
        let now = Utc.with_ymd_and_hms(2026, 1, 12, 8, 0, 0).unwrap();
        let wait = time_until_next_run(now, chrono_tz::UTC);
        assert_eq!(wait, Duration::from_secs(3 * 3600));
    }

    #[test]
    fn monday_afternoon_waits_a_full_week() {
        let now = Utc.with_ymd_and_hms(2026, 1, 12, 12, 0, 0).unwrap();
        let wait = time_until_next_run(now, chrono_tz::UTC);
        assert_eq!(wait, Duration::from_secs((6 * 24 + 23) * 3600));
    }
}
