//! Handlers for the `ticket` subcommands

use super::common::{HandlerContext, parse_priority};
use crate::cli::TicketCommands;
use crate::cli::output::{OutputFormatter, priority_label, status_label};
use crate::core::{ClientId, Principal, Status, TechnicianId, Ticket, TicketId, TicketScope};
use crate::error::Result;
use crate::service::{NewTicket, TicketUpdate};
use colored::Colorize;

pub async fn handle_ticket_command(
    command: TicketCommands,
    ctx: &HandlerContext,
    principal: &Principal,
    output: &OutputFormatter,
) -> Result<()> {
    match command {
        TicketCommands::New {
            title,
            description,
            category,
            priority,
            client,
            technician,
        } => {
            let new = NewTicket {
                title,
                description,
                priority: parse_priority(priority.as_deref())?,
                category_id: ctx.resolve_category(principal, &category).await?,
                client_id: client.as_deref().map(str::parse::<ClientId>).transpose()?,
                technician_id: technician
                    .as_deref()
                    .map(str::parse::<TechnicianId>)
                    .transpose()?,
            };
            let ticket = ctx.tickets.create(principal, new).await?;
            report_ticket(output, &ticket, &format!("Created ticket '{}'", ticket.title))
        },
        TicketCommands::List {
            client,
            technician,
            status,
        } => {
            let scope = match (client, technician) {
                (Some(client), _) => TicketScope::Client(client.parse()?),
                (None, Some(technician)) => TicketScope::Technician(technician.parse()?),
                (None, None) => TicketScope::All,
            };
            let status = status.as_deref().map(str::parse::<Status>).transpose()?;
            let mut tickets = ctx.tickets.list(principal, scope).await?;
            if let Some(status) = status {
                tickets.retain(|t| t.status == status);
            }
            report_tickets(output, &tickets)
        },
        TicketCommands::Mine => {
            let tickets = ctx.tickets.my_tickets(principal).await?;
            report_tickets(output, &tickets)
        },
        TicketCommands::Assigned => {
            let tickets = ctx.tickets.assigned(principal).await?;
            report_tickets(output, &tickets)
        },
        TicketCommands::Show { ticket } => {
            let id: TicketId = ticket.parse()?;
            let ticket = ctx.tickets.get(principal, &id).await?;
            if output.is_json() {
                output.print_json(&serde_json::json!({ "ticket": ticket }))?;
            } else {
                print_ticket_details(output, &ticket);
            }
            Ok(())
        },
        TicketCommands::Edit {
            ticket,
            title,
            description,
            priority,
            category,
            technician,
        } => {
            let id: TicketId = ticket.parse()?;
            let category_id = match category {
                Some(category) => Some(ctx.resolve_category(principal, &category).await?),
                None => None,
            };
            let update = TicketUpdate {
                title,
                description,
                priority: parse_priority(priority.as_deref())?,
                category_id,
                technician_id: technician
                    .as_deref()
                    .map(str::parse::<TechnicianId>)
                    .transpose()?,
            };
            let ticket = ctx.tickets.update(principal, &id, update).await?;
            report_ticket(output, &ticket, &format!("Updated ticket '{}'", ticket.title))
        },
        TicketCommands::Status { ticket, status } => {
            let id: TicketId = ticket.parse()?;
            let requested: Status = status.parse()?;
            let ticket = ctx.tickets.update_status(principal, &id, requested).await?;
            report_ticket(
                output,
                &ticket,
                &format!("Ticket '{}' is now {}", ticket.title, status_label(ticket.status)),
            )
        },
        TicketCommands::Assign { ticket, technician } => {
            let id: TicketId = ticket.parse()?;
            let technician_id: TechnicianId = technician.parse()?;
            let ticket = ctx
                .tickets
                .assign_technician(principal, &id, &technician_id)
                .await?;
            report_ticket(
                output,
                &ticket,
                &format!(
                    "Assigned technician {} to '{}'",
                    technician_id.short(),
                    ticket.title
                ),
            )
        },
        TicketCommands::Delete { ticket } => {
            let id: TicketId = ticket.parse()?;
            ctx.tickets.remove(principal, &id).await?;
            if output.is_json() {
                output.print_json(&serde_json::json!({ "status": "success", "deleted": id }))?;
            } else {
                output.success(&format!("Deleted ticket {}", id.short()));
            }
            Ok(())
        },
    }
}

fn report_ticket(output: &OutputFormatter, ticket: &Ticket, message: &str) -> Result<()> {
    if output.is_json() {
        output.print_json(&serde_json::json!({ "status": "success", "ticket": ticket }))?;
    } else {
        output.success(message);
        output.info(&format!("Ticket ID: {}", ticket.id));
    }
    Ok(())
}

fn report_tickets(output: &OutputFormatter, tickets: &[Ticket]) -> Result<()> {
    if output.is_json() {
        return output.print_json(&serde_json::json!({
            "tickets": tickets,
            "count": tickets.len(),
        }));
    }

    if tickets.is_empty() {
        output.info("No tickets found");
        return Ok(());
    }
    for ticket in tickets {
        output.info(&format!(
            "{}  {}  {}  {}",
            ticket.id.short().cyan(),
            status_label(ticket.status),
            priority_label(ticket.priority),
            ticket.title.bold()
        ));
    }
    output.info("");
    output.info(&format!("{} ticket(s)", tickets.len()));
    Ok(())
}

fn print_ticket_details(output: &OutputFormatter, ticket: &Ticket) {
    output.info(&format!("{} {}", "Ticket".bold(), ticket.id));
    output.info(&format!("Title:       {}", ticket.title.bold()));
    output.info(&format!("Status:      {}", status_label(ticket.status)));
    output.info(&format!("Priority:    {}", priority_label(ticket.priority)));
    output.info(&format!("Client:      {}", ticket.client_id));
    output.info(&format!(
        "Technician:  {}",
        ticket
            .technician_id
            .map_or_else(|| "unassigned".dimmed().to_string(), |id| id.to_string())
    ));
    output.info(&format!("Category:    {}", ticket.category_id));
    output.info(&format!(
        "Created:     {}",
        ticket.created_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.info(&format!(
        "Updated:     {}",
        ticket.updated_at.format("%Y-%m-%d %H:%M UTC")
    ));
    output.info("");
    output.info(&ticket.description);
}
