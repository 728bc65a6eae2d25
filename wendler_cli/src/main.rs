use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use wendler_core::*;

#[derive(Parser)]
#[command(name = "wendler")]
#[command(about = "5/3/1 strength program tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Prescribe and run the next session (default)
    Now {
        /// Lift to train instead of the next one in the rotation
        #[arg(long)]
        lift: Option<String>,

        /// Dry run - show prescription without logging
        #[arg(long)]
        dry_run: bool,

        /// Auto-complete (for testing) - mark every set done
        #[arg(long)]
        auto_complete: bool,

        /// Reps to log on the AMRAP set when auto-completing
        #[arg(long, requires = "auto_complete")]
        amrap_reps: Option<u32>,

        /// Don't run the rest timer between sets
        #[arg(long)]
        no_rest: bool,
    },

    /// Show the plates needed per side for a bar load
    Plates {
        /// Total bar load
        weight: f64,
    },

    /// List past sessions
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Export history to a CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show or edit the lifter profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Manage accessory exercises
    Accessory {
        #[command(subcommand)]
        action: AccessoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// Delete a session by id
    Delete { id: String },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the current profile
    Show,

    /// Update one-rep maxes, training max, position or template
    Set {
        #[arg(long)]
        squat: Option<String>,
        #[arg(long)]
        bench: Option<String>,
        #[arg(long)]
        deadlift: Option<String>,
        #[arg(long)]
        ohp: Option<String>,
        /// Training max as a percentage, e.g. 85
        #[arg(long)]
        tm: Option<String>,
        #[arg(long)]
        week: Option<u32>,
        #[arg(long)]
        cycle: Option<u32>,
        /// fsl, bbb, ssl, bbs or widowmaker
        #[arg(long)]
        template: Option<String>,
    },
}

#[derive(Subcommand)]
enum AccessoryAction {
    /// Add an accessory to a main lift's sessions
    Add {
        name: String,
        #[arg(long)]
        sets: u32,
        #[arg(long)]
        reps: u32,
        /// squat, bench, deadlift or ohp
        #[arg(long)]
        lift: String,
    },

    /// List accessories
    List,

    /// Remove an accessory by id
    Remove { id: String },
}

/// File locations under the data directory
struct Paths {
    profile: PathBuf,
    accessories: PathBuf,
    sessions: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            profile: data_dir.join("profile.json"),
            accessories: data_dir.join("accessories.json"),
            sessions: data_dir.join("sessions.jsonl"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    wendler_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    std::fs::create_dir_all(&data_dir)?;
    let paths = Paths::new(&data_dir);

    match cli.command {
        Some(Commands::Now {
            lift,
            dry_run,
            auto_complete,
            amrap_reps,
            no_rest,
        }) => cmd_now(
            &paths,
            &config,
            lift,
            dry_run,
            auto_complete,
            amrap_reps,
            no_rest,
        ),
        Some(Commands::Plates { weight }) => {
            cmd_plates(&config, weight);
            Ok(())
        }
        Some(Commands::History { action, csv }) => cmd_history(&paths, action, csv),
        Some(Commands::Profile { action }) => cmd_profile(&paths, action),
        Some(Commands::Accessory { action }) => cmd_accessory(&paths, action),
        None => {
            // Default to "now" command
            cmd_now(&paths, &config, None, false, false, None, false)
        }
    }
}

fn cmd_now(
    paths: &Paths,
    config: &Config,
    lift: Option<String>,
    dry_run: bool,
    auto_complete: bool,
    amrap_reps: Option<u32>,
    no_rest: bool,
) -> Result<()> {
    let profiles = JsonProfileStore::new(&paths.profile);
    let mut sessions = JsonlSessionStore::new(&paths.sessions);
    let accessories = JsonAccessoryStore::new(&paths.accessories);

    let profile = profiles.load_or_default();
    let history = sessions.list_sessions()?;

    let lift = match lift.as_deref().map(str::parse::<Lift>) {
        Some(Ok(lift)) => lift,
        Some(Err(e)) => {
            eprintln!("{}. Using the rotation.", e);
            next_lift(&history)
        }
        None => next_lift(&history),
    };

    let related = accessories.accessories_for(lift).unwrap_or_else(|e| {
        tracing::warn!("Failed to load accessories: {}", e);
        Vec::new()
    });

    let mut driver = WorkoutDriver::new(lift, profile, &related)
        .with_progression(config.progression.clone());
    display_prescription(&driver, &PlateResolver::from_config(&config.plates));

    if dry_run {
        println!("\n[Dry run - not logging session]");
        return Ok(());
    }

    // The rest timer ticks on the runtime's workers while stdin blocks here
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    if auto_complete {
        complete_all(&mut driver, amrap_reps)?;
    } else if no_rest {
        run_interactive(&mut driver)?;
    } else {
        let (tx, rx) = feedback_channel();
        runtime.spawn(print_feedback(rx));
        driver = driver.with_rest_timer(RestTimer::new(tx), config.rest.seconds);
        run_interactive(&mut driver)?;
    }

    let (next, session) = driver.finish(chrono::Utc::now());
    record_outcome(&profiles, &mut sessions, &next, &session);

    println!("\n✓ Session logged!");
    if session.amrap_reps > 0 {
        println!(
            "  AMRAP: {:.1} x {} (est. 1RM {:.1})",
            session.amrap_weight,
            session.amrap_reps,
            session.estimated_one_rep_max()
        );
    }
    println!(
        "  Next: {} - Cycle {} • Week {}",
        next_lift(&[session]),
        next.current_cycle,
        next.current_week
    );

    Ok(())
}

fn complete_all(driver: &mut WorkoutDriver, amrap_reps: Option<u32>) -> Result<()> {
    for category in CATEGORIES {
        for index in 0..driver.workout().sets(category).len() {
            let is_amrap = driver.workout().sets(category)[index].is_amrap();
            if let (true, Some(reps)) = (is_amrap, amrap_reps) {
                driver.set_actual_reps(category, index, reps)?;
            }
            driver.toggle_set(category, index)?;
        }
    }
    Ok(())
}

const CATEGORIES: [SetCategory; 4] = [
    SetCategory::Warmup,
    SetCategory::Main,
    SetCategory::Supplemental,
    SetCategory::Accessory,
];

fn run_interactive(driver: &mut WorkoutDriver) -> Result<()> {
    println!("─────────────────────────────────────────");
    println!("Press Enter when a set is done");
    println!("  's' + Enter to skip it");
    println!("  'q' + Enter to finish the session now");

    for category in CATEGORIES {
        for index in 0..driver.workout().sets(category).len() {
            let set = driver.workout().sets(category)[index].clone();
            print!("\n{:?} {}: {} > ", category, index + 1, format_set(&set));
            io::stdout().flush()?;

            match read_line()?.as_str() {
                "s" => continue,
                "q" => return Ok(()),
                _ => {}
            }

            if set.is_amrap() {
                let target = set.target_reps().unwrap_or(0);
                print!("  Reps performed [{}]: ", target);
                io::stdout().flush()?;
                let reps = read_line()?.parse().unwrap_or(target);
                driver.set_actual_reps(category, index, reps)?;
            }
            driver.toggle_set(category, index)?;
        }
    }

    Ok(())
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_lowercase())
}

async fn print_feedback(mut rx: tokio::sync::mpsc::UnboundedReceiver<FeedbackEvent>) {
    while let Some(event) = rx.recv().await {
        match event {
            FeedbackEvent::TimerStarted { duration } => eprintln!("  Rest {}s", duration),
            FeedbackEvent::TimerTick { remaining } if event.is_countdown_warning() => {
                eprintln!("  {}...", remaining)
            }
            FeedbackEvent::TimerComplete => eprintln!("  Rest over - next set!"),
            _ => {}
        }
    }
}

fn format_set(set: &PrescribedSet) -> String {
    if set.category == SetCategory::Accessory {
        set.reps.clone()
    } else {
        format!("{:.1} x {}", set.weight, set.reps)
    }
}

fn display_prescription(driver: &WorkoutDriver, plates: &PlateResolver) {
    let profile = driver.profile();
    let lift = driver.lift();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", lift.name().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Cycle {} • Week {} • {}",
        profile.current_cycle,
        profile.current_week,
        profile.selected_template
    );
    println!("  Training max: {:.1}", profile.training_max(lift));

    for (title, category) in [
        ("Warmup", SetCategory::Warmup),
        ("Main", SetCategory::Main),
        ("Supplemental", SetCategory::Supplemental),
        ("Accessories", SetCategory::Accessory),
    ] {
        let sets = driver.workout().sets(category);
        if sets.is_empty() {
            continue;
        }
        println!();
        println!("  {}", title);
        for set in sets {
            if category == SetCategory::Accessory {
                println!("    → {}", format_set(set));
            } else {
                let breakdown = plates.resolve(set.weight);
                println!("    → {}  [{}]", format_set(set), format_plates(&breakdown));
            }
        }
    }

    println!();
}

fn format_plates(breakdown: &PlateBreakdown) -> String {
    if breakdown.is_bar_only() {
        return "bar only".to_string();
    }
    breakdown
        .plates
        .iter()
        .map(|p| format!("{}x{}", p.plate, p.count))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn cmd_plates(config: &Config, weight: f64) {
    let breakdown = PlateResolver::from_config(&config.plates).resolve(weight);

    println!("{:.1} lbs ({} lb bar)", weight, breakdown.bar_weight);
    if breakdown.is_bar_only() {
        println!("  Bar only");
        return;
    }

    println!("  Per side: {:.1}", breakdown.per_side);
    for plate in &breakdown.plates {
        println!("  {:>5.1} lb x{}", plate.plate, plate.count);
    }
    if breakdown.remainder > 0.0 {
        println!("  ({:.1} per side can't be made with these plates)", breakdown.remainder);
    }
}

fn cmd_history(paths: &Paths, action: Option<HistoryAction>, csv: Option<PathBuf>) -> Result<()> {
    let mut sessions = JsonlSessionStore::new(&paths.sessions);

    if let Some(HistoryAction::Delete { id }) = action {
        let id = uuid::Uuid::parse_str(&id)
            .map_err(|e| Error::Validation(format!("Invalid session id: {}", e)))?;
        if sessions.delete_session(id)? {
            println!("✓ Deleted session {}", id);
        } else {
            println!("No session with id {}", id);
        }
        return Ok(());
    }

    let history = sessions.list_sessions()?;

    if let Some(csv_path) = csv {
        let count = export_sessions_csv(&history, &csv_path)?;
        println!("✓ Exported {} sessions", count);
        println!("  CSV: {}", csv_path.display());
        return Ok(());
    }

    if history.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }

    for session in &history {
        let outcome = if session.amrap_reps > 0 {
            format!(
                "{:.1} x {} (est. 1RM {:.1})",
                session.amrap_weight,
                session.amrap_reps,
                session.estimated_one_rep_max()
            )
        } else {
            "Completed".to_string()
        };
        println!(
            "{}  {:<14}  W{} C{}  {}  [{}]",
            session.date.format("%Y-%m-%d"),
            session.main_lift.name(),
            session.week,
            session.cycle,
            outcome,
            session.id
        );
    }

    Ok(())
}

fn cmd_profile(paths: &Paths, action: Option<ProfileAction>) -> Result<()> {
    let profiles = JsonProfileStore::new(&paths.profile);
    let mut profile = profiles.load_or_default();

    if let Some(ProfileAction::Set {
        squat,
        bench,
        deadlift,
        ohp,
        tm,
        week,
        cycle,
        template,
    }) = action
    {
        let edit = ProfileEdit {
            squat,
            bench,
            deadlift,
            ohp,
            training_max: tm,
            week,
            cycle,
            template: template.as_deref().map(str::parse::<Template>).transpose()?,
        };
        if edit.is_empty() {
            println!("Nothing to change.");
        } else {
            edit.apply(&mut profile);
            if let Err(e) = profiles.save_profile(&profile) {
                tracing::warn!("Failed to save profile: {}", e);
            }
            println!("✓ Profile updated");
        }
    }

    print_profile(&profile);
    Ok(())
}

fn print_profile(profile: &LifterProfile) {
    println!("Cycle {} • Week {}", profile.current_cycle, profile.current_week);
    println!("Template: {}", profile.selected_template);
    println!("Training max: {:.0}%", profile.training_max_percentage * 100.0);
    for lift in Lift::ALL {
        println!(
            "  {:<14} 1RM {:>6.1}  TM {:>6.1}",
            lift.name(),
            profile.one_rep_max(lift),
            profile.training_max(lift)
        );
    }
}

fn cmd_accessory(paths: &Paths, action: AccessoryAction) -> Result<()> {
    let mut store = JsonAccessoryStore::new(&paths.accessories);

    match action {
        AccessoryAction::Add {
            name,
            sets,
            reps,
            lift,
        } => {
            let accessory = AccessoryExercise::new(name, sets, reps, lift.parse()?)?;
            let summary = format!(
                "{} ({}x{}) to {} days",
                accessory.name, accessory.target_sets, accessory.target_reps, accessory.related_lift
            );
            store.add_accessory(accessory)?;
            println!("✓ Added {}", summary);
        }
        AccessoryAction::List => {
            let accessories = store.list_accessories()?;
            if accessories.is_empty() {
                println!("No accessories yet.");
            }
            for accessory in accessories {
                println!(
                    "{:<14}  {} {}x{}  [{}]",
                    accessory.related_lift.name(),
                    accessory.name,
                    accessory.target_sets,
                    accessory.target_reps,
                    accessory.id
                );
            }
        }
        AccessoryAction::Remove { id } => {
            let id = uuid::Uuid::parse_str(&id)
                .map_err(|e| Error::Validation(format!("Invalid accessory id: {}", e)))?;
            if store.remove_accessory(id)? {
                println!("✓ Removed accessory {}", id);
            } else {
                println!("No accessory with id {}", id);
            }
        }
    }

    Ok(())
}
