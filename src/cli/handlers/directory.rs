//! Handlers for registration and the user, client, technician and category
//! commands

use super::common::HandlerContext;
use crate::cli::output::OutputFormatter;
use crate::cli::{CategoryCommands, ClientCommands, TechnicianCommands, UserCommands};
use crate::core::{ClientId, Principal, Role, TechnicianId};
use crate::error::Result;
use crate::service::{
    CategoryUpdate, ClientUpdate, NewCategory, NewClient, NewTechnician, NewUser, Registration,
    TechnicianUpdate, UserUpdate,
};
use colored::Colorize;

pub async fn handle_register(
    ctx: &HandlerContext,
    registration: Registration,
    output: &OutputFormatter,
) -> Result<()> {
    let (user, client) = ctx.directory.register(registration).await?;

    if output.is_json() {
        output.print_json(&serde_json::json!({
            "status": "success",
            "user": user,
            "client": client,
        }))?;
    } else {
        output.success(&format!("Registered {} <{}>", user.name, user.email));
        output.info(&format!("Client ID: {}", client.id));
        output.info(&format!(
            "Use --as {} to file tickets as this client",
            user.email
        ));
    }
    Ok(())
}

pub async fn handle_user_command(
    command: UserCommands,
    ctx: &HandlerContext,
    principal: &Principal,
    output: &OutputFormatter,
) -> Result<()> {
    match command {
        UserCommands::Add { name, email, role } => {
            let role: Role = role.parse()?;
            let user = ctx
                .directory
                .create_user(principal, NewUser { name, email, role })
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "user": user }))?;
            } else {
                output.success(&format!(
                    "Created {} user {} <{}>",
                    user.role, user.name, user.email
                ));
                output.info(&format!("User ID: {}", user.id));
            }
        },
        UserCommands::List => {
            let users = ctx.directory.list_users(principal).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "users": users,
                    "count": users.len(),
                }))?;
            } else if users.is_empty() {
                output.info("No users found");
            } else {
                for user in &users {
                    let mut line = format!(
                        "{}  {} <{}>  {}",
                        user.id.short().cyan(),
                        user.name.bold(),
                        user.email,
                        user.role
                    );
                    if !user.is_active {
                        line.push_str(&format!("  {}", "inactive".dimmed()));
                    }
                    output.info(&line);
                }
            }
        },
        UserCommands::Update {
            user,
            name,
            email,
            active,
        } => {
            let id = ctx.resolve_user(&user).await?;
            let user = ctx
                .directory
                .update_user(
                    principal,
                    &id,
                    UserUpdate {
                        name,
                        email,
                        is_active: active,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "user": user }))?;
            } else {
                output.success(&format!("Updated user {} <{}>", user.name, user.email));
            }
        },
        UserCommands::Remove { user } => {
            let id = ctx.resolve_user(&user).await?;
            ctx.directory.remove_user(principal, &id).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "deleted": id }))?;
            } else {
                output.success(&format!("Deleted user {user}"));
            }
        },
    }
    Ok(())
}

pub async fn handle_client_command(
    command: ClientCommands,
    ctx: &HandlerContext,
    principal: &Principal,
    output: &OutputFormatter,
) -> Result<()> {
    match command {
        ClientCommands::Add {
            name,
            email,
            company,
            phone,
            user,
        } => {
            let user_id = match user {
                Some(email) => Some(ctx.resolve_user(&email).await?),
                None => None,
            };
            let client = ctx
                .directory
                .create_client(
                    principal,
                    NewClient {
                        name,
                        contact_email: email,
                        company,
                        phone,
                        user_id,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "client": client }))?;
            } else {
                output.success(&format!("Created client {}", client.name));
                output.info(&format!("Client ID: {}", client.id));
            }
        },
        ClientCommands::Update {
            client,
            name,
            email,
            company,
            phone,
            active,
        } => {
            let id: ClientId = client.parse()?;
            let client = ctx
                .directory
                .update_client(
                    principal,
                    &id,
                    ClientUpdate {
                        name,
                        contact_email: email,
                        company,
                        phone,
                        is_active: active,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "client": client }))?;
            } else {
                output.success(&format!("Updated client {}", client.name));
            }
        },
        ClientCommands::List { active } => {
            let clients = ctx.directory.list_clients(principal, active).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "clients": clients,
                    "count": clients.len(),
                }))?;
            } else if clients.is_empty() {
                output.info("No clients found");
            } else {
                for client in &clients {
                    let mut line = format!(
                        "{}  {} <{}>",
                        client.id.short().cyan(),
                        client.name.bold(),
                        client.contact_email
                    );
                    if let Some(company) = &client.company {
                        line.push_str(&format!("  ({company})"));
                    }
                    if !client.is_active {
                        line.push_str(&format!("  {}", "inactive".dimmed()));
                    }
                    output.info(&line);
                }
            }
        },
        ClientCommands::Remove { client } => {
            let id: ClientId = client.parse()?;
            ctx.directory.remove_client(principal, &id).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "deleted": id }))?;
            } else {
                output.success(&format!("Deleted client {}", id.short()));
            }
        },
    }
    Ok(())
}

pub async fn handle_technician_command(
    command: TechnicianCommands,
    ctx: &HandlerContext,
    principal: &Principal,
    output: &OutputFormatter,
) -> Result<()> {
    match command {
        TechnicianCommands::Add {
            name,
            specialty,
            user,
        } => {
            let user_id = match user {
                Some(email) => Some(ctx.resolve_user(&email).await?),
                None => None,
            };
            let technician = ctx
                .directory
                .create_technician(
                    principal,
                    NewTechnician {
                        name,
                        specialty,
                        user_id,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "status": "success",
                    "technician": technician,
                }))?;
            } else {
                output.success(&format!("Created technician {}", technician.name));
                output.info(&format!("Technician ID: {}", technician.id));
            }
        },
        TechnicianCommands::List { available } => {
            let technicians = ctx.directory.list_technicians(principal, available).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "technicians": technicians,
                    "count": technicians.len(),
                }))?;
            } else if technicians.is_empty() {
                output.info("No technicians found");
            } else {
                for summary in &technicians {
                    let technician = &summary.technician;
                    let load = format!(
                        "{}/{} in progress",
                        summary.in_progress,
                        crate::lifecycle::MAX_IN_PROGRESS_TICKETS
                    );
                    let load = if summary.at_capacity {
                        load.red().bold()
                    } else {
                        load.green()
                    };
                    let specialty = technician.specialty.as_deref().unwrap_or("general");
                    let mut line = format!(
                        "{}  {}  [{specialty}]  {load}",
                        technician.id.short().cyan(),
                        technician.name.bold(),
                    );
                    if !technician.is_available() {
                        line.push_str(&format!("  {}", "unavailable".dimmed()));
                    }
                    output.info(&line);
                }
            }
        },
        TechnicianCommands::Update {
            technician,
            name,
            specialty,
            available,
            active,
        } => {
            let id: TechnicianId = technician.parse()?;
            let technician = ctx
                .directory
                .update_technician(
                    principal,
                    &id,
                    TechnicianUpdate {
                        name,
                        specialty,
                        availability: available,
                        is_active: active,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "status": "success",
                    "technician": technician,
                }))?;
            } else {
                output.success(&format!("Updated technician {}", technician.name));
            }
        },
        TechnicianCommands::Remove { technician } => {
            let id: TechnicianId = technician.parse()?;
            let unassigned = ctx.directory.remove_technician(principal, &id).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "status": "success",
                    "deleted": id,
                    "unassigned_tickets": unassigned,
                }))?;
            } else {
                output.success(&format!("Deleted technician {}", id.short()));
                if unassigned > 0 {
                    output.warning(&format!(
                        "{unassigned} ticket(s) no longer have a technician"
                    ));
                }
            }
        },
    }
    Ok(())
}

pub async fn handle_category_command(
    command: CategoryCommands,
    ctx: &HandlerContext,
    principal: &Principal,
    output: &OutputFormatter,
) -> Result<()> {
    match command {
        CategoryCommands::Add { name, description } => {
            let category = ctx
                .directory
                .create_category(principal, NewCategory { name, description })
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "status": "success",
                    "category": category,
                }))?;
            } else {
                output.success(&format!("Created category {}", category.name));
                output.info(&format!("Category ID: {}", category.id));
            }
        },
        CategoryCommands::List => {
            let categories = ctx.directory.list_categories(principal).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "categories": categories,
                    "count": categories.len(),
                }))?;
            } else if categories.is_empty() {
                output.info("No categories found");
            } else {
                for category in &categories {
                    let mut line =
                        format!("{}  {}", category.id.short().cyan(), category.name.bold());
                    if let Some(description) = &category.description {
                        line.push_str(&format!("  {description}"));
                    }
                    if !category.is_active {
                        line.push_str(&format!("  {}", "inactive".dimmed()));
                    }
                    output.info(&line);
                }
            }
        },
        CategoryCommands::Update {
            category,
            name,
            description,
            active,
        } => {
            let id = ctx.resolve_category(principal, &category).await?;
            let category = ctx
                .directory
                .update_category(
                    principal,
                    &id,
                    CategoryUpdate {
                        name,
                        description,
                        is_active: active,
                    },
                )
                .await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({
                    "status": "success",
                    "category": category,
                }))?;
            } else {
                output.success(&format!("Updated category {}", category.name));
            }
        },
        CategoryCommands::Remove { category } => {
            let id = ctx.resolve_category(principal, &category).await?;
            ctx.directory.remove_category(principal, &id).await?;

            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "deleted": id }))?;
            } else {
                output.success(&format!("Deleted category {category}"));
            }
        },
    }
    Ok(())
}
