use clap::{Parser, Subcommand};
use serde_json::Value;
use spm_core::constants::REGISTRATION_FIELDS;
use spm_core::store::FileStore;
use spm_core::{DashboardService, Fields, PatientService};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "spm")]
#[command(about = "Smart Patient Management CLI")]
struct Cli {
    /// Patient data directory (defaults to $PATIENT_DATA_DIR, then "patient_data")
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient record as JSON
    Show {
        /// Patient id
        patient_id: String,
    },
    /// Register a new patient
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        aadhaar: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Conventionally "inpatient" or "outpatient"
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        ward: Option<String>,
    },
    /// Merge fields into a patient record
    Update {
        /// Patient id
        patient_id: String,
        /// Fields as key=value; values that parse as JSON are stored as JSON
        #[arg(required = true, value_parser = parse_assignment)]
        fields: Vec<(String, Value)>,
    },
    /// Delete a patient record
    Delete {
        /// Patient id
        patient_id: String,
    },
    /// Print in/out-patient and per-ward counts
    Dashboard,
}

fn parse_assignment(input: &str) -> Result<(String, Value), String> {
    let (key, raw) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", input))?;
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", input));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        std::env::var("PATIENT_DATA_DIR")
            .unwrap_or_else(|_| spm_core::DEFAULT_PATIENT_DATA_DIR.into())
            .into()
    });
    let service = PatientService::new(Arc::new(FileStore::new(data_dir)));

    match cli.command {
        Some(Commands::List) => match service.list_all() {
            Ok(records) if records.is_empty() => println!("No patients found."),
            Ok(records) => {
                for record in records {
                    let text = |field: &str| match record.get(field) {
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Null) | None => "-".to_string(),
                        Some(other) => other.to_string(),
                    };
                    println!(
                        "ID: {}, Name: {}, Status: {}, Ward: {}",
                        record.patient_id().unwrap_or("-"),
                        text("name"),
                        text("status"),
                        text("ward")
                    );
                }
            }
            Err(e) => eprintln!("Error listing patients: {}", e),
        },
        Some(Commands::Show { patient_id }) => match service.get(&patient_id) {
            Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            Err(e) => eprintln!("Error reading patient: {}", e),
        },
        Some(Commands::Register {
            name,
            aadhaar,
            age,
            gender,
            status,
            ward,
        }) => {
            let fields: Fields = REGISTRATION_FIELDS
                .iter()
                .zip([name, aadhaar, age, gender, status, ward])
                .map(|(key, value)| (key.to_string(), value.map_or(Value::Null, Value::String)))
                .collect();
            match service.register(fields) {
                Ok(patient_id) => println!("Patient Registered! Unique ID: {}", patient_id),
                Err(e) => eprintln!("Error registering patient: {}", e),
            }
        }
        Some(Commands::Update { patient_id, fields }) => {
            match service.update(&patient_id, fields.into_iter().collect()) {
                Ok(()) => println!("Updated patient: {}", patient_id),
                Err(e) => eprintln!("Error updating patient: {}", e),
            }
        }
        Some(Commands::Delete { patient_id }) => match service.delete(&patient_id) {
            Ok(()) => println!("Deleted patient: {}", patient_id),
            Err(e) => eprintln!("Error deleting patient: {}", e),
        },
        Some(Commands::Dashboard) => match DashboardService::new(service).summarize() {
            Ok(summary) => {
                println!("Total patients: {}", summary.total);
                println!("Inpatients:     {}", summary.inpatients);
                println!("Outpatients:    {}", summary.outpatients);
                for (ward, count) in summary.ward_counts.iter() {
                    println!("  {}: {}", ward, count);
                }
            }
            Err(e) => eprintln!("Error loading dashboard: {}", e),
        },
        None => {
            println!("Use 'spm --help' for commands");
        }
    }

    Ok(())
}
