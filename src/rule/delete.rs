use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    rule::{
        db::delete_rule,
        models::{RuleId, RuleState},
    },
};

/// The response body for the delete rule endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Always true on success.
    pub ok: bool,
}

/// A route handler for deleting a rule.
pub async fn delete_rule_endpoint(
    Path(rule_id): Path<RuleId>,
    State(state): State<RuleState>,
) -> Result<Json<DeleteResponse>, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    delete_rule(rule_id, &connection).inspect_err(|error| match error {
        Error::DeleteMissingRule => {}
        error => {
            tracing::error!("An unexpected error occurred while deleting rule {rule_id}: {error}")
        }
    })?;

    Ok(Json(DeleteResponse { ok: true }))
}

#[cfg(test)]
mod delete_rule_endpoint_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        AppState, build_router, endpoints,
        endpoints::format_endpoint,
        rule::{
            db::create_rule,
            models::{Rule, RuleDraft, RuleId},
        },
    };

    fn test_server_with_rule() -> (TestServer, RuleId) {
        let connection = Connection::open_in_memory().expect("Could not open database in memory");
        let state = AppState::new(connection).expect("Could not initialize database");

        let rule_id = {
            let connection = state.db_connection.lock().unwrap();
            create_rule(
                RuleDraft {
                    name: "To Delete".to_owned(),
                    ..Default::default()
                },
                &connection,
            )
            .unwrap()
            .id
        };

        let server = TestServer::new(build_router(state));

        (server, rule_id)
    }

    #[tokio::test]
    async fn delete_rule_removes_it_from_listing() {
        let (server, rule_id) = test_server_with_rule();

        let response = server
            .delete(&format_endpoint(endpoints::RULE, rule_id))
            .await;

        response.assert_status_ok();

        let rules = server.get(endpoints::RULES).await.json::<Vec<Rule>>();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_rule_returns_not_found() {
        let (server, _rule_id) = test_server_with_rule();

        let response = server.delete(&format_endpoint(endpoints::RULE, 999)).await;

        response.assert_status_not_found();
    }
}
