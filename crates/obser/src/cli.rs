// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subcommands of the `obser` binary. Each prints one JSON document.

use clap::Subcommand;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::{self, credentials, projects, services};
use crate::auth::session;
use crate::client::ApiClient;
use crate::selection::{select_project, SelectionStore};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session tokens.
    Login {
        email: String,
        #[arg(long, env = "OBSER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and store the session tokens.
    Register {
        email: String,
        #[arg(long, env = "OBSER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the claims of the stored access token.
    Whoami,
    /// Manage projects.
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// Manage members of a project.
    Members {
        /// Project id. Defaults to the selected project.
        #[arg(long, short)]
        project: Option<i64>,
        #[command(subcommand)]
        command: MembersCommand,
    },
    /// List users that can be added to projects.
    Users,
    /// Manage credentials of a project.
    Credentials {
        /// Project id. Defaults to the selected project.
        #[arg(long, short)]
        project: Option<i64>,
        #[command(subcommand)]
        command: CredentialsCommand,
    },
    /// Manage service instances of a project.
    Services {
        /// Project id. Defaults to the selected project.
        #[arg(long, short)]
        project: Option<i64>,
        #[command(subcommand)]
        command: ServicesCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectsCommand {
    List {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = projects::DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    Get {
        id: i64,
    },
    Create {
        code: String,
        display_name: String,
        #[arg(long)]
        kind: Option<String>,
    },
    Update {
        id: i64,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        kind: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Select the project later commands act on.
    Use {
        id: i64,
    },
    /// Show the selected project, picking the first one if none is stored.
    Current,
}

#[derive(Debug, Subcommand)]
pub enum MembersCommand {
    List,
    Add {
        user_id: i64,
        #[arg(long)]
        role: Option<String>,
    },
    Remove {
        user_id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum CredentialsCommand {
    List,
    Get {
        id: i64,
    },
    Create {
        kind: String,
        secret_ref: String,
        #[arg(long)]
        expires_at: Option<String>,
        /// JSON object.
        #[arg(long, value_parser = parse_json)]
        metadata: Option<Value>,
    },
    Update {
        id: i64,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        secret_ref: Option<String>,
        #[arg(long)]
        expires_at: Option<String>,
        #[arg(long, value_parser = parse_json)]
        metadata: Option<Value>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum ServicesCommand {
    List,
    Get {
        id: i64,
    },
    Create {
        service_type_id: i64,
        name: String,
        endpoint: String,
        #[arg(long)]
        environment_id: Option<i64>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, value_parser = parse_json)]
        metadata: Option<Value>,
    },
    Update {
        id: i64,
        #[arg(long)]
        service_type_id: Option<i64>,
        #[arg(long)]
        environment_id: Option<i64>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, value_parser = parse_json)]
        metadata: Option<Value>,
    },
    Delete {
        id: i64,
    },
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

fn to_json<T: Serialize>(value: T) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(value)?)
}

async fn project_id(
    client: &ApiClient,
    selection: &SelectionStore,
    requested: Option<i64>,
) -> anyhow::Result<i64> {
    Ok(select_project(client, selection, requested).await?.id)
}

/// Run one subcommand and return its JSON output.
pub async fn execute(
    client: &ApiClient,
    selection: &SelectionStore,
    command: Command,
) -> anyhow::Result<Value> {
    match command {
        Command::Login { email, password } => {
            session::login(client, &email, &password).await?;
            Ok(json!({ "logged_in": true, "email": email }))
        }
        Command::Register { email, password, full_name } => {
            session::register(client, &email, &password, full_name.as_deref()).await?;
            Ok(json!({ "registered": true, "email": email }))
        }
        Command::Logout => {
            session::logout(client);
            Ok(json!({ "logged_out": true }))
        }
        Command::Whoami => {
            let claims = session::current_claims(client)
                .ok_or_else(|| anyhow::anyhow!("not logged in (no decodable access token)"))?;
            Ok(json!({ "claims": claims, "is_superuser": session::is_superuser(client) }))
        }
        Command::Projects(cmd) => projects_command(client, selection, cmd).await,
        Command::Members { project, command } => {
            let project = project_id(client, selection, project).await?;
            members_command(client, project, command).await
        }
        Command::Users => to_json(projects::list_users(client).await?),
        Command::Credentials { project, command } => {
            let project = project_id(client, selection, project).await?;
            credentials_command(client, project, command).await
        }
        Command::Services { project, command } => {
            let project = project_id(client, selection, project).await?;
            services_command(client, project, command).await
        }
    }
}

async fn projects_command(
    client: &ApiClient,
    selection: &SelectionStore,
    cmd: ProjectsCommand,
) -> anyhow::Result<Value> {
    match cmd {
        ProjectsCommand::List { skip, limit } => to_json(projects::list(client, skip, limit).await?),
        ProjectsCommand::Get { id } => to_json(projects::get(client, id).await?),
        ProjectsCommand::Create { code, display_name, kind } => {
            let data = api::ProjectCreate { code, display_name, kind };
            to_json(projects::create(client, &data).await?)
        }
        ProjectsCommand::Update { id, code, display_name, kind } => {
            let data = api::ProjectUpdate { code, display_name, kind };
            to_json(projects::update(client, id, &data).await?)
        }
        ProjectsCommand::Delete { id } => {
            projects::delete(client, id).await?;
            Ok(json!({ "deleted": true }))
        }
        ProjectsCommand::Use { id } => to_json(select_project(client, selection, Some(id)).await?),
        ProjectsCommand::Current => to_json(select_project(client, selection, None).await?),
    }
}

async fn members_command(
    client: &ApiClient,
    project: i64,
    cmd: MembersCommand,
) -> anyhow::Result<Value> {
    match cmd {
        MembersCommand::List => to_json(projects::list_members(client, project).await?),
        MembersCommand::Add { user_id, role } => {
            let data = api::ProjectMemberCreate { user_id, role };
            to_json(projects::add_member(client, project, &data).await?)
        }
        MembersCommand::Remove { user_id } => {
            projects::remove_member(client, project, user_id).await?;
            Ok(json!({ "removed": true }))
        }
    }
}

async fn credentials_command(
    client: &ApiClient,
    project: i64,
    cmd: CredentialsCommand,
) -> anyhow::Result<Value> {
    match cmd {
        CredentialsCommand::List => to_json(credentials::list(client, project).await?),
        CredentialsCommand::Get { id } => to_json(credentials::get(client, project, id).await?),
        CredentialsCommand::Create { kind, secret_ref, expires_at, metadata } => {
            let data = api::CredentialCreate { kind, secret_ref, expires_at, metadata };
            to_json(credentials::create(client, project, &data).await?)
        }
        CredentialsCommand::Update { id, kind, secret_ref, expires_at, metadata } => {
            let data = api::CredentialUpdate { kind, secret_ref, expires_at, metadata };
            to_json(credentials::update(client, project, id, &data).await?)
        }
        CredentialsCommand::Delete { id } => {
            credentials::delete(client, project, id).await?;
            Ok(json!({ "deleted": true }))
        }
    }
}

async fn services_command(
    client: &ApiClient,
    project: i64,
    cmd: ServicesCommand,
) -> anyhow::Result<Value> {
    match cmd {
        ServicesCommand::List => to_json(services::list(client, project).await?),
        ServicesCommand::Get { id } => to_json(services::get(client, project, id).await?),
        ServicesCommand::Create {
            service_type_id,
            name,
            endpoint,
            environment_id,
            port,
            status,
            metadata,
        } => {
            let data = api::ServiceInstanceCreate {
                service_type_id,
                environment_id,
                name,
                endpoint,
                port,
                status,
                metadata,
            };
            to_json(services::create(client, project, &data).await?)
        }
        ServicesCommand::Update {
            id,
            service_type_id,
            environment_id,
            name,
            endpoint,
            port,
            status,
            metadata,
        } => {
            let data = api::ServiceInstanceUpdate {
                service_type_id,
                environment_id,
                name,
                endpoint,
                port,
                status,
                metadata,
            };
            to_json(services::update(client, project, id, &data).await?)
        }
        ServicesCommand::Delete { id } => {
            services::delete(client, project, id).await?;
            Ok(json!({ "deleted": true }))
        }
    }
}
