use std::fmt::Write as _;

use anyhow::anyhow;
use chrono::Local;
use tokio::{sync::watch, task::JoinHandle};
use weather_core::{Units, ViewState, WeatherOrchestrator, WeatherSnapshot};

/// Print the current snapshot, or turn a pending error into the command's
/// failure. The error is reset either way.
pub fn report(orch: &WeatherOrchestrator, units: Units) -> anyhow::Result<()> {
    let state = orch.state();
    orch.reset_error();

    if let Some(error) = state.error {
        return Err(anyhow!(error));
    }

    match state.snapshot {
        Some(snapshot) => print!("{}", snapshot_text(&snapshot, units)),
        None => println!(
            "No saved search yet.\n\
             Hint: run `weather search <city>` or `weather locate`."
        ),
    }
    Ok(())
}

/// Echo loading transitions to stderr until the orchestrator goes away.
pub fn spawn_loading_indicator(mut rx: watch::Receiver<ViewState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut was_loading = false;
        while rx.changed().await.is_ok() {
            let loading = rx.borrow_and_update().is_loading;
            if loading && !was_loading {
                eprintln!("Fetching weather...");
            }
            was_loading = loading;
        }
    })
}

pub fn snapshot_text(snap: &WeatherSnapshot, units: Units) -> String {
    let t = units.temperature_suffix();
    let mut out = String::new();

    let name = snap.city_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown place");
    match &snap.description {
        Some(desc) => {
            let _ = writeln!(out, "{name} - {desc}");
        }
        None => {
            let _ = writeln!(out, "{name}");
        }
    }

    if let Some(temp) = snap.temperature {
        let _ = match snap.feels_like {
            Some(feels) => writeln!(out, "  Temperature  {temp:.1}{t} (feels like {feels:.1}{t})"),
            None => writeln!(out, "  Temperature  {temp:.1}{t}"),
        };
    }

    if let (Some(lo), Some(hi)) = (snap.temp_min, snap.temp_max) {
        let _ = writeln!(out, "  Low / High   {lo:.1}{t} / {hi:.1}{t}");
    }

    if let Some(h) = snap.humidity {
        let _ = writeln!(out, "  Humidity     {h}%");
    }

    if let Some(speed) = snap.wind_speed {
        let dir = snap.wind_direction.as_deref().unwrap_or("");
        let _ = writeln!(out, "  Wind         {speed:.1} {} {dir}", units.speed_suffix());
    }

    let rain: Vec<String> = [(snap.rain_1h, "1h"), (snap.rain_3h, "3h")]
        .into_iter()
        .filter_map(|(mm, window)| mm.map(|mm| format!("{mm:.2} mm ({window})")))
        .collect();
    if !rain.is_empty() {
        let _ = writeln!(out, "  Rain         {}", rain.join(", "));
    }

    if let Some(icon) = &snap.icon_url {
        let _ = writeln!(out, "  Icon         {icon}");
    }

    if let Some(at) = snap.observed_at {
        let _ = writeln!(
            out,
            "  Observed     {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    // Lines end in trailing spaces when a wind direction is missing.
    out.lines().map(|l| format!("{}\n", l.trim_end())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_full_snapshot() {
        let snap = WeatherSnapshot {
            city_name: Some("Paris".into()),
            description: Some("clear sky".into()),
            temperature: Some(72.46),
            feels_like: Some(71.0),
            temp_min: Some(68.0),
            temp_max: Some(75.2),
            humidity: Some(40),
            wind_speed: Some(5.75),
            wind_direction: Some("E".into()),
            rain_1h: Some(0.4),
            icon_url: Some("https://openweathermap.org/img/wn/01d@2x.png".into()),
            ..Default::default()
        };

        let text = snapshot_text(&snap, Units::Imperial);

        assert!(text.starts_with("Paris - clear sky\n"));
        assert!(text.contains("Temperature  72.5°F (feels like 71.0°F)"));
        assert!(text.contains("Low / High   68.0°F / 75.2°F"));
        assert!(text.contains("Humidity     40%"));
        assert!(text.contains("Wind         5.8 mph E"));
        assert!(text.contains("Rain         0.40 mm (1h)"));
        assert!(text.contains("Icon         https://openweathermap.org/img/wn/01d@2x.png"));
    }

    #[test]
    fn renders_sparse_snapshot() {
        let snap = WeatherSnapshot { wind_speed: Some(2.0), ..Default::default() };

        let text = snapshot_text(&snap, Units::Metric);

        assert_eq!(text, "Unknown place\n  Wind         2.0 m/s\n");
    }
}
