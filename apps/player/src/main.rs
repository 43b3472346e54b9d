use std::{io::Write as _, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use shared::{
    domain::{InteractiveType, OptionBounds, OptionRecord, WidgetId},
    protocol::SelectionEvent,
};
use tracing::{info, warn};
use uuid::Uuid;
use widget_core::{
    fonts::{FontService, NoopFontLoader},
    AnalyticsSink, HttpResponseBackend, InteractiveWidget, ResponseBackend, WidgetConfig,
    WidgetPresentation,
};

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Option label, repeat the flag once per option.
    #[arg(long = "label", required = true)]
    labels: Vec<String>,
    /// Aggregate endpoint; omit to run local-only.
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long, value_enum, default_value = "poll")]
    kind: Kind,
    /// Index of the correct option, quizzes only.
    #[arg(long)]
    correct: Option<usize>,
    #[arg(long, default_value = "demo-widget")]
    widget_id: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Quiz,
    Poll,
}

impl From<Kind> for InteractiveType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Quiz => InteractiveType::Quiz,
            Kind::Poll => InteractiveType::Poll,
        }
    }
}

struct TerminalPresentation {
    labels: Vec<String>,
}

impl WidgetPresentation for TerminalPresentation {
    fn build(&self) {
        println!("Pick an option:");
        for (index, label) in self.labels.iter().enumerate() {
            println!("  [{index}] {label}");
        }
    }

    fn apply_percentages(&self, percentages: &[u8]) {
        for (label, pct) in self.labels.iter().zip(percentages) {
            let bar = "#".repeat(usize::from(*pct) / 2);
            println!("  {label:<20} {pct:>3}% {bar}");
        }
    }

    fn show_post_selection(&self, selected_index: usize, has_aggregate_data: bool) {
        let label = self
            .labels
            .get(selected_index)
            .map(String::as_str)
            .unwrap_or("?");
        if has_aggregate_data {
            println!("You picked '{label}'. Community results:");
        } else {
            println!("You picked '{label}'.");
        }
    }
}

struct LoggingAnalytics;

impl AnalyticsSink for LoggingAnalytics {
    fn selection_made(&self, event: SelectionEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!("analytics: {json}"),
            Err(err) => warn!("analytics event not serializable: {err}"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = load_settings();

    let interactive_type = InteractiveType::from(args.kind);
    let options: Vec<OptionRecord> = args
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| OptionRecord {
            index,
            label: label.clone(),
            is_correct: args.correct == Some(index),
        })
        .collect();

    let endpoint = args.endpoint.or(settings.endpoint);
    let backend: Option<Arc<dyn ResponseBackend>> = match endpoint {
        Some(endpoint) => {
            let client_id = settings
                .client_id
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            match HttpResponseBackend::new(&endpoint, interactive_type, client_id) {
                Ok(backend) => Some(Arc::new(backend)),
                Err(err) => {
                    warn!("ignoring endpoint, running local-only: {err}");
                    None
                }
            }
        }
        None => None,
    };

    let widget = InteractiveWidget::new(
        WidgetConfig {
            widget_id: WidgetId(args.widget_id),
            interactive_type,
            options,
            bounds: OptionBounds::default(),
        },
        backend,
        Arc::new(TerminalPresentation {
            labels: args.labels,
        }),
        Arc::new(LoggingAnalytics),
        FontService::new(Arc::new(NoopFontLoader)),
    )?;

    widget.attach().await;

    print!("> ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    match line.trim().parse::<usize>() {
        Ok(index) => widget.tap_option(index).await,
        Err(_) => println!("not an option index, leaving the widget untouched"),
    }

    // Give the fire-and-forget submission a moment before teardown.
    tokio::time::sleep(Duration::from_millis(300)).await;
    widget.detach().await;

    Ok(())
}
