//! Auto-categorization of newly created tickets.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use crate::error::FeedError;
use crate::feed::FeedMessage;

pub const CATEGORIES: [&str; 4] = ["Mechanical", "Quality", "Maintenance", "Technical"];

/// Anything that executes a natural-language instruction and reports back
/// in text. Failures are part of the returned text, never an error.
#[async_trait]
pub trait TicketAgent: Send + Sync {
    async fn invoke(&self, instruction: &str) -> String;
}

/// The instruction sent to the agent for a newly created ticket.
pub fn categorization_instruction(ticket_id: &str) -> String {
    let categories: Vec<String> = CATEGORIES.iter().map(|c| format!("- {}", c)).collect();
    format!(
        "Based only on the ticket information, categorize the ticket into one of the following categories:\n\
         \n\
         {}\n\
         \n\
         Ticket ID: {}",
        categories.join("\n"),
        ticket_id
    )
}

/// Returns the instruction for `message` if it announces a created ticket.
pub fn instruction_for(message: &FeedMessage) -> Option<String> {
    match message {
        FeedMessage::Update(event) if event.is_created() => {
            event.ticket_id.as_deref().map(categorization_instruction)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizeSummary {
    /// Feed messages consumed
    pub events_seen:         usize,
    /// Instructions sent to the agent
    pub tickets_categorized: usize,
}

/// Consumes `events` one at a time, waiting for the agent to finish with a
/// ticket before pulling the next message. Ends when the feed closes or
/// reports an error.
pub async fn run_categorizer<S, A>(events: S, agent: &A) -> CategorizeSummary
where
    S: Stream<Item = Result<FeedMessage, FeedError>>,
    A: TicketAgent + ?Sized,
{
    let mut events = std::pin::pin!(events);
    let mut summary = CategorizeSummary::default();

    while let Some(item) = events.next().await {
        let message = match item {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "ticket feed ended with an error");
                break;
            }
        };
        summary.events_seen += 1;

        let Some(instruction) = instruction_for(&message) else {
            tracing::debug!(ticket_id = ?message.ticket_id(), "not a new ticket, skipping");
            continue;
        };

        let ticket_id = message.ticket_id().unwrap_or_default();
        println!("Categorizing ticket: {}", ticket_id);
        tracing::info!(ticket_id = %ticket_id, "categorizing ticket");

        let result = agent.invoke(&instruction).await;
        summary.tickets_categorized += 1;
        tracing::info!(
            ticket_id = %ticket_id,
            result    = %result.chars().take(200).collect::<String>(),
            "categorization finished"
        );
    }

    tracing::info!(
        events_seen         = summary.events_seen,
        tickets_categorized = summary.tickets_categorized,
        "categorizer stopped"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{TicketUpdateEvent, UpdateType};

    fn update(id: Option<&str>, kind: Option<UpdateType>) -> FeedMessage {
        FeedMessage::Update(TicketUpdateEvent {
            ticket_id:   id.map(str::to_string),
            update_type: kind,
        })
    }

    #[test]
    fn instruction_matches_template() {
        let expected = "Based only on the ticket information, categorize the ticket into one of the following categories:\n\
                        \n\
                        - Mechanical\n\
                        - Quality\n\
                        - Maintenance\n\
                        - Technical\n\
                        \n\
                        Ticket ID: t-9";
        assert_eq!(categorization_instruction("t-9"), expected);
    }

    #[test]
    fn only_created_updates_with_ids_qualify() {
        assert!(instruction_for(&update(Some("a"), Some(UpdateType::Created))).is_some());
        assert!(instruction_for(&update(Some("a"), Some(UpdateType::Updated))).is_none());
        assert!(instruction_for(&update(Some("a"), None)).is_none());
        assert!(instruction_for(&update(None, Some(UpdateType::Created))).is_none());
        assert!(instruction_for(&FeedMessage::Raw("a".to_string())).is_none());
    }
}
