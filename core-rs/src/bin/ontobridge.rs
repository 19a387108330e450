//! ontobridge - command-line front end for the ontology bridge
//!
//! Each subcommand runs one operation and prints its response envelope as
//! JSON. The process exits non-zero when the operation fails.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, Level};

use ontobridge_core::directory;
use ontobridge_core::service::*;
use ontobridge_core::{BridgeConfig, OntologyService, OxigraphStore, Response};

#[derive(Parser)]
#[command(name = "ontobridge")]
#[command(version)]
#[command(about = "Ontology query translation and user alias management", long_about = None)]
struct Cli {
    /// Bridge config file (YAML)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get or create the ontology alias of a user
    Alias {
        username: String,
    },
    /// Record a cognitive test performance
    RecordPerformance {
        /// Test individual
        #[arg(long)]
        test: String,
        /// Patient ontology alias
        #[arg(long)]
        patient: String,
        /// Unix timestamp (> 0)
        #[arg(long, allow_hyphen_values = true)]
        timestamp: i64,
        /// Score in [0, 100]
        #[arg(long, allow_hyphen_values = true)]
        score: i64,
    },
    /// Create a cognitive test definition
    CreateTest {
        /// Test type class (e.g., ArithmeticCts)
        #[arg(long = "type")]
        test_type: String,
        /// Difficulty (>= 1)
        #[arg(long, allow_hyphen_values = true)]
        difficulty: i64,
        /// Asset path under the assets root
        #[arg(long)]
        path: String,
        /// Test subtype class
        #[arg(long)]
        subtype: String,
        /// Supported language (repeatable)
        #[arg(long = "language")]
        languages: Vec<String>,
    },
    /// List tests of a type in a language
    TestsOfType {
        test_type: String,
        language: String,
    },
    /// List a user's performance records for a test type
    Performance {
        /// Ontology alias
        alias: String,
        test_type: String,
    },
    /// Clear a user's performance records
    ClearPerformance {
        username: String,
        /// Only records of this test type
        #[arg(long)]
        test_type: Option<String>,
    },
    /// List subclasses of a class
    Subclasses {
        class: String,
        /// Include indirect subclasses
        #[arg(long, short)]
        recursive: bool,
    },
    /// List superclasses of a class
    Superclasses {
        class: String,
        /// Include indirect superclasses
        #[arg(long, short)]
        recursive: bool,
    },
    /// Check whether PARENT is an ancestor of CHILD
    IsSubclass {
        parent: String,
        child: String,
        /// Consider indirect ancestry
        #[arg(long, short)]
        recursive: bool,
    },
    /// Create an instance of a class owned by a user
    CreateInstance {
        username: String,
        class: String,
    },
    /// List a user's instances of a class ("*" for any)
    Instances {
        username: String,
        #[arg(default_value = ANY_CLASS)]
        class: String,
    },
    /// Dump the ontology to a path under the ontology root
    Dump {
        file: String,
    },
    /// Load an ontology file from under the ontology root
    Load {
        file: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_service(config: BridgeConfig) -> Result<OntologyService> {
    fs::create_dir_all(&config.ontology_root).with_context(|| {
        format!(
            "Failed to create ontology root {}",
            config.ontology_root.display()
        )
    })?;

    let users = directory::from_config(&config.directory).context("Failed to open user directory")?;

    let has_dump = config.ontology_root.join(&config.default_dump).is_file();
    let store = if has_dump {
        OxigraphStore::new()?
    } else {
        OxigraphStore::with_seed()?
    };

    let service = OntologyService::new(config, Box::new(store), users)?;
    if has_dump {
        service.restore().context("Failed to load the default ontology dump")?;
        info!("restored ontology from {}", service.persistence().default_path().display());
    } else {
        debug!("no ontology dump found, starting from the seed ontology");
    }

    Ok(service)
}

fn emit<T: Serialize>(response: Response<T>) -> Result<bool> {
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.success)
}

fn run(service: &OntologyService, command: Commands) -> Result<bool> {
    match command {
        Commands::Alias { username } => emit(service.create_ontology_alias(&CreateAliasRequest { username })),
        Commands::RecordPerformance {
            test,
            patient,
            timestamp,
            score,
        } => emit(service.record_user_performance(&RecordPerformanceRequest {
            test,
            patient_ontology_alias: patient,
            timestamp,
            score,
        })),
        Commands::CreateTest {
            test_type,
            difficulty,
            path,
            subtype,
            languages,
        } => emit(service.create_cognitive_test(&CreateCognitiveTestRequest {
            test_type,
            test_difficulty: difficulty,
            test_path: path,
            test_subtype: subtype,
            supported_languages: languages,
        })),
        Commands::TestsOfType { test_type, language } => emit(service.cognitive_tests_of_type(&TestsOfTypeRequest {
            test_type,
            test_language: language,
        })),
        Commands::Performance { alias, test_type } => {
            emit(service.user_performance_cognitive_tests(&UserPerformanceRequest {
                ontology_alias: alias,
                test_type,
            }))
        }
        Commands::ClearPerformance { username, test_type } => {
            emit(service.clear_user_performance(&ClearPerformanceRequest {
                username,
                test_type: test_type.unwrap_or_default(),
            }))
        }
        Commands::Subclasses { class, recursive } => emit(service.subclasses_of(&ClassQueryRequest {
            ontology_class: class,
            recursive,
        })),
        Commands::Superclasses { class, recursive } => emit(service.superclasses_of(&ClassQueryRequest {
            ontology_class: class,
            recursive,
        })),
        Commands::IsSubclass {
            parent,
            child,
            recursive,
        } => emit(service.is_subsuperclass_of(&SubSuperclassRequest {
            parent_class: parent,
            child_class: child,
            recursive,
        })),
        Commands::CreateInstance { username, class } => emit(service.create_instance(&CreateInstanceRequest {
            username,
            ontology_class: class,
        })),
        Commands::Instances { username, class } => emit(service.user_instances_of_class(&UserInstancesRequest {
            username,
            ontology_class: class,
        })),
        Commands::Dump { file } => emit(service.dump_ontology(&OntologyFileRequest { file_url: file })),
        Commands::Load { file } => emit(service.load_ontology(&OntologyFileRequest { file_url: file })),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => BridgeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => BridgeConfig::default(),
    };

    let service = build_service(config)?;

    if !run(&service, cli.command)? {
        std::process::exit(1);
    }

    Ok(())
}
