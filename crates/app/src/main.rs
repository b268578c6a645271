//! Orbit Admin CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use orbit_app::{
    context::{AppContext, AppSettings},
    database::DatabaseSettings,
    domain::{
        companies::{
            CompaniesService,
            data::{NewCompany, NewProject},
            records::{CompanyId, ProjectId},
        },
        vault::VaultService,
    },
};
use zeroize::Zeroizing;

#[derive(Debug, Parser)]
#[command(name = "orbit-app", about = "Orbit admin CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, default_value = "")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    Company(CompanyCommand),
    Project(ProjectCommand),
    Vault(VaultCommand),
}

#[derive(Debug, Args)]
struct CompanyCommand {
    #[command(subcommand)]
    command: CompanySubcommand,
}

#[derive(Debug, Subcommand)]
enum CompanySubcommand {
    Create(CreateCompanyArgs),
}

#[derive(Debug, Args)]
struct CreateCompanyArgs {
    /// Company display name
    #[arg(long)]
    name: String,

    /// User who becomes the founding Partner
    #[arg(long)]
    partner_user_id: i64,
}

#[derive(Debug, Args)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProjectSubcommand {
    Create(CreateProjectArgs),
}

#[derive(Debug, Args)]
struct CreateProjectArgs {
    #[arg(long)]
    company_id: i64,

    /// Project display name
    #[arg(long)]
    name: String,
}

#[derive(Debug, Args)]
struct VaultCommand {
    #[command(subcommand)]
    command: VaultSubcommand,
}

#[derive(Debug, Subcommand)]
enum VaultSubcommand {
    SetMasterPassword(SetMasterPasswordArgs),
}

#[derive(Debug, Args)]
struct SetMasterPasswordArgs {
    #[arg(long)]
    project_id: i64,

    /// Partner of the project's company performing the change
    #[arg(long)]
    actor_user_id: i64,

    /// New master password
    #[arg(long, env = "ORBIT_MASTER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if cli.database_url.trim().is_empty() {
        return Err("--database-url or DATABASE_URL is required".to_string());
    }

    let mut settings = AppSettings::new(DatabaseSettings::new(cli.database_url));
    settings.migrate = matches!(cli.command, Commands::Migrate);

    let context = AppContext::from_settings(&settings)
        .await
        .map_err(|error| format!("{error}: {}", source_of(&error)))?;

    let result = match cli.command {
        Commands::Migrate => {
            println!("migrations applied");

            Ok(())
        }
        Commands::Company(CompanyCommand {
            command: CompanySubcommand::Create(args),
        }) => create_company(&context, args).await,
        Commands::Project(ProjectCommand {
            command: ProjectSubcommand::Create(args),
        }) => create_project(&context, args).await,
        Commands::Vault(VaultCommand {
            command: VaultSubcommand::SetMasterPassword(args),
        }) => set_master_password(&context, args).await,
    };

    context.db.close().await;

    result
}

async fn create_company(context: &AppContext, args: CreateCompanyArgs) -> Result<(), String> {
    let company = context
        .companies
        .create_company(NewCompany {
            name: args.name,
            founder: args.partner_user_id.into(),
        })
        .await
        .map_err(|error| format!("failed to create company: {error}"))?;

    println!("company_id: {}", company.id);
    println!("company_name: {}", company.name);

    Ok(())
}

async fn create_project(context: &AppContext, args: CreateProjectArgs) -> Result<(), String> {
    let project = context
        .companies
        .create_project(NewProject {
            company: CompanyId::from_i64(args.company_id),
            name: args.name,
        })
        .await
        .map_err(|error| format!("failed to create project: {error}"))?;

    println!("project_id: {}", project.id);
    println!("project_name: {}", project.name);

    Ok(())
}

async fn set_master_password(
    context: &AppContext,
    args: SetMasterPasswordArgs,
) -> Result<(), String> {
    let password = Zeroizing::new(args.password);

    context
        .vault
        .set_master_password(
            args.actor_user_id.into(),
            ProjectId::from_i64(args.project_id),
            &password,
        )
        .await
        .map_err(|error| format!("failed to set master password: {error}"))?;

    println!("master password updated; open vault sessions were revoked");

    Ok(())
}

fn source_of(error: &dyn std::error::Error) -> String {
    error
        .source()
        .map_or_else(|| "no further detail".to_string(), ToString::to_string)
}
