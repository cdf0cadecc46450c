//! View-state machines for the generator and admin screens.
//!
//! Each user action issues at most one outstanding request, tracked by a
//! loading latch that makes re-triggering a no-op while the call is in
//! flight. The host drives the machines: a `begin_*` method hands back the
//! request to execute (or `None` when the action is suppressed), and the
//! matching `complete_*`/`fail_*` method applies the outcome.

use shared::{Child, CreateChildRequest, SavedSnack, SaveSnackRequest, SnackSuggestion, UpdateChildRequest};

use crate::client::SnackApiClient;
use crate::http::{HttpRequest, HttpResponse};

const FETCH_CHILDREN_ERROR: &str = "Error fetching children.";
const GENERATE_ERROR: &str = "Error generating snack. Please try again.";
const MALFORMED_SNACK_ERROR: &str = "Failed to generate snack";

/// State of the main screen: pick children, request a snack, maybe save it.
pub struct SuggestionFlow {
    client: SnackApiClient,
    children: Vec<Child>,
    selected: Vec<i64>,
    loading: bool,
    error: Option<String>,
    suggestion: Option<SnackSuggestion>,
    save_pending: bool,
    snack_saved: bool,
    dismissed: bool,
    last_save_message: Option<String>,
}

impl SuggestionFlow {
    pub fn new(client: SnackApiClient) -> Self {
        Self {
            client,
            children: Vec::new(),
            selected: Vec::new(),
            loading: false,
            error: None,
            suggestion: None,
            save_pending: false,
            snack_saved: false,
            dismissed: false,
            last_save_message: None,
        }
    }

    // --- roster ---

    /// Request to (re)load the children roster.
    pub fn load_children_request(&self) -> HttpRequest {
        self.client.build_list_children()
    }

    pub fn apply_children(&mut self, response: HttpResponse) {
        match self.client.parse_list_children(response) {
            Ok(children) => self.children = children,
            Err(e) => self.error = Some(e.display_message(FETCH_CHILDREN_ERROR)),
        }
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Replace the current selection. No validation: an empty selection is
    /// allowed here and rejected by the backend.
    pub fn select(&mut self, child_ids: Vec<i64>) {
        self.selected = child_ids;
    }

    // --- suggestion request ---

    /// Start a suggestion request. Returns `None` while one is already in
    /// flight; otherwise clears the previous suggestion, error, and save
    /// latch before handing back the request.
    pub fn begin_request(&mut self) -> Option<HttpRequest> {
        if self.loading {
            return None;
        }
        self.error = None;
        self.suggestion = None;
        self.save_pending = false;
        self.snack_saved = false;
        self.dismissed = false;
        self.last_save_message = None;

        match self.client.build_request_snack(&self.selected) {
            Ok(request) => {
                self.loading = true;
                Some(request)
            }
            Err(e) => {
                self.error = Some(e.display_message(GENERATE_ERROR));
                None
            }
        }
    }

    pub fn complete_request(&mut self, response: HttpResponse) {
        self.loading = false;
        match self.client.parse_request_snack(response) {
            Ok(suggestion) => self.suggestion = Some(suggestion),
            Err(e) => self.error = Some(e.display_message(MALFORMED_SNACK_ERROR)),
        }
    }

    /// The request never produced a response (transport failure).
    pub fn fail_request(&mut self) {
        self.loading = false;
        self.error = Some(GENERATE_ERROR.to_string());
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The suggestion to render, unless it has been dismissed.
    pub fn suggestion(&self) -> Option<&SnackSuggestion> {
        if self.dismissed {
            return None;
        }
        self.suggestion.as_ref()
    }

    /// Whether the card gets the "loving this snack" highlight.
    pub fn highlight(&self) -> bool {
        self.suggestion().map(|s| s.exists).unwrap_or(false)
    }

    // --- save ---

    /// Start saving the displayed suggestion for the first selected child.
    /// At most one save request is issued per displayed suggestion: returns
    /// `None` when nothing is displayed, a save is in flight, or the
    /// suggestion was already saved.
    pub fn begin_save(&mut self) -> Option<HttpRequest> {
        if self.save_pending || self.snack_saved {
            return None;
        }
        let suggestion = self.suggestion()?;
        let child_id = *self.selected.first()?;

        let request = self
            .client
            .build_save_snack(&SaveSnackRequest {
                child_id,
                snack: suggestion.snack.clone(),
                image_url: suggestion.image_url.clone(),
            })
            .ok()?;
        self.save_pending = true;
        Some(request)
    }

    pub fn complete_save(&mut self, response: HttpResponse) {
        self.save_pending = false;
        // A failed save stays silent on screen; the latch re-arms so the
        // user can try again.
        if let Ok(message) = self.client.parse_save_snack(response) {
            self.snack_saved = true;
            self.last_save_message = Some(message);
        }
    }

    pub fn fail_save(&mut self) {
        self.save_pending = false;
    }

    pub fn is_snack_saved(&self) -> bool {
        self.snack_saved
    }

    /// Confirmation text of the last successful save.
    pub fn save_message(&self) -> Option<&str> {
        self.last_save_message.as_deref()
    }

    // --- dismiss ---

    /// Hide the current suggestion. Purely local: the preference is not
    /// persisted anywhere.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}

/// Outcome of the most recent admin action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionState {
    Idle,
    Loading,
    Success(String),
    Error(String),
}

/// State of the admin screen: child CRUD plus the per-child saved snacks.
pub struct AdminFlow {
    client: SnackApiClient,
    action: ActionState,
    needs_refresh: bool,
    snacks: Vec<SavedSnack>,
    snacks_stale: bool,
}

impl AdminFlow {
    pub fn new(client: SnackApiClient) -> Self {
        Self {
            client,
            action: ActionState::Idle,
            needs_refresh: false,
            snacks: Vec::new(),
            snacks_stale: false,
        }
    }

    pub fn action(&self) -> &ActionState {
        &self.action
    }

    /// Whether the roster must be re-fetched after a successful mutation.
    /// Draining resets the flag.
    pub fn take_needs_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_refresh)
    }

    /// Whether the saved-snack list must be re-fetched after a delete.
    pub fn take_snacks_stale(&mut self) -> bool {
        std::mem::take(&mut self.snacks_stale)
    }

    pub fn snacks(&self) -> &[SavedSnack] {
        &self.snacks
    }

    fn begin(&mut self, request: Result<HttpRequest, crate::error::ApiError>) -> Option<HttpRequest> {
        if self.action == ActionState::Loading {
            return None;
        }
        match request {
            Ok(request) => {
                self.action = ActionState::Loading;
                Some(request)
            }
            Err(e) => {
                self.action = ActionState::Error(e.to_string());
                None
            }
        }
    }

    /// The in-flight request never produced a response.
    pub fn fail_action(&mut self, message: &str) {
        self.action = ActionState::Error(message.to_string());
    }

    // --- child CRUD ---

    pub fn begin_add_child(&mut self, name: &str, exclusions: &str) -> Option<HttpRequest> {
        let request = self.client.build_add_child(&CreateChildRequest {
            name: name.to_string(),
            exclusions: exclusions.to_string(),
        });
        self.begin(request)
    }

    pub fn complete_add_child(&mut self, response: HttpResponse) {
        match self.client.parse_add_child(response) {
            Ok(_) => {
                self.action = ActionState::Success("Child added successfully!".to_string());
                self.needs_refresh = true;
            }
            Err(e) => {
                self.action =
                    ActionState::Error(e.display_message("Error adding child. Please try again."));
            }
        }
    }

    pub fn begin_update_child(
        &mut self,
        child_id: i64,
        update: UpdateChildRequest,
    ) -> Option<HttpRequest> {
        let request = self.client.build_update_child(child_id, &update);
        self.begin(request)
    }

    pub fn complete_update_child(&mut self, response: HttpResponse) {
        match self.client.parse_update_child(response) {
            Ok(_) => {
                self.action = ActionState::Success("Child updated successfully!".to_string());
                self.needs_refresh = true;
            }
            Err(e) => {
                self.action = ActionState::Error(
                    e.display_message("Error updating child. Please try again."),
                );
            }
        }
    }

    pub fn begin_delete_child(&mut self, child_id: i64) -> Option<HttpRequest> {
        let request = Ok(self.client.build_delete_child(child_id));
        self.begin(request)
    }

    pub fn complete_delete_child(&mut self, response: HttpResponse) {
        match self.client.parse_delete_child(response) {
            Ok(message) => {
                self.action = ActionState::Success(message);
                self.needs_refresh = true;
            }
            Err(e) => {
                self.action = ActionState::Error(
                    e.display_message("Error deleting child. Please try again."),
                );
            }
        }
    }

    // --- saved snacks ---

    pub fn begin_load_snacks(&mut self, child_id: i64) -> Option<HttpRequest> {
        let request = Ok(self.client.build_list_saved(child_id));
        self.begin(request)
    }

    pub fn complete_load_snacks(&mut self, response: HttpResponse) {
        match self.client.parse_list_saved(response) {
            Ok(snacks) => {
                self.snacks = snacks;
                self.action = ActionState::Idle;
            }
            Err(e) => {
                self.action = ActionState::Error(
                    e.display_message("Error fetching snacks. Please try again."),
                );
            }
        }
    }

    pub fn begin_delete_snack(&mut self, snack_id: i64) -> Option<HttpRequest> {
        let request = Ok(self.client.build_delete_saved(snack_id));
        self.begin(request)
    }

    pub fn complete_delete_snack(&mut self, response: HttpResponse) {
        match self.client.parse_delete_saved(response) {
            Ok(message) => {
                self.action = ActionState::Success(message);
                self.snacks_stale = true;
            }
            Err(e) => {
                self.action = ActionState::Error(
                    e.display_message("Error deleting snack. Please try again."),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn flow() -> SuggestionFlow {
        SuggestionFlow::new(SnackApiClient::new(""))
    }

    fn roster_response() -> HttpResponse {
        HttpResponse::new(
            200,
            r#"[{"id":1,"name":"Maya","exclusions":"nuts"},{"id":2,"name":"Leo","exclusions":""}]"#,
        )
    }

    fn suggestion_response(exists: bool) -> HttpResponse {
        HttpResponse::new(
            200,
            format!(r#"{{"snack":"Apple","image_url":"x","exists":{exists}}}"#),
        )
    }

    #[test]
    fn roster_load_lists_exactly_the_returned_children() {
        let mut flow = flow();
        flow.apply_children(roster_response());
        assert_eq!(flow.children().len(), 2);
        assert_eq!(flow.children()[0].id, 1);
        assert_eq!(flow.children()[1].id, 2);
        assert!(flow.error().is_none());
    }

    #[test]
    fn roster_load_failure_sets_inline_error() {
        let mut flow = flow();
        flow.apply_children(HttpResponse::new(500, r#"{"error":"boom"}"#));
        assert!(flow.children().is_empty());
        assert_eq!(flow.error(), Some("boom"));
    }

    #[test]
    fn request_while_loading_is_a_no_op() {
        let mut flow = flow();
        flow.select(vec![1]);

        let first = flow.begin_request();
        assert!(first.is_some());
        assert!(flow.is_loading());

        // Re-triggering while in flight issues nothing.
        assert!(flow.begin_request().is_none());

        flow.complete_request(suggestion_response(false));
        assert!(!flow.is_loading());
        assert!(flow.begin_request().is_some());
    }

    #[test]
    fn empty_selection_is_allowed_client_side() {
        let mut flow = flow();
        let request = flow.begin_request().expect("request should be issued");
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some(r#"{"children":[]}"#));
    }

    #[test]
    fn successful_request_displays_the_suggestion() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(suggestion_response(false));

        let suggestion = flow.suggestion().expect("suggestion displayed");
        assert_eq!(suggestion.snack, "Apple");
        assert_eq!(suggestion.image_url, "x");
        assert!(!flow.highlight());
    }

    #[test]
    fn exists_flag_drives_the_highlight() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(suggestion_response(true));
        assert!(flow.highlight());
    }

    #[test]
    fn server_error_shows_message_and_no_snack() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(HttpResponse::new(
            500,
            r#"{"error":"Error generating snack. Please try again."}"#,
        ));

        assert!(flow.suggestion().is_none());
        assert_eq!(
            flow.error(),
            Some("Error generating snack. Please try again.")
        );
    }

    #[test]
    fn transport_failure_shows_generic_message() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.fail_request();
        assert_eq!(
            flow.error(),
            Some("Error generating snack. Please try again.")
        );
        assert!(!flow.is_loading());
    }

    #[test]
    fn save_issues_at_most_one_request_per_suggestion() {
        let mut flow = flow();
        flow.select(vec![1, 2]);
        flow.begin_request();
        flow.complete_request(suggestion_response(false));

        let first = flow.begin_save().expect("first save issued");
        // Save targets the first selected child.
        assert!(first.body.as_deref().unwrap().contains(r#""child_id":1"#));

        // Second trigger while the save is in flight: nothing.
        assert!(flow.begin_save().is_none());

        flow.complete_save(HttpResponse::new(
            200,
            r#"{"message":"Snack saved successfully"}"#,
        ));
        assert!(flow.is_snack_saved());
        assert_eq!(flow.save_message(), Some("Snack saved successfully"));

        // And after success the latch stays closed.
        assert!(flow.begin_save().is_none());
    }

    #[test]
    fn failed_save_rearms_the_latch() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(suggestion_response(false));

        assert!(flow.begin_save().is_some());
        flow.fail_save();
        assert!(!flow.is_snack_saved());
        assert!(flow.begin_save().is_some());
    }

    #[test]
    fn new_suggestion_resets_the_save_latch() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(suggestion_response(false));
        flow.begin_save();
        flow.complete_save(HttpResponse::new(
            200,
            r#"{"message":"Snack saved successfully"}"#,
        ));
        assert!(flow.is_snack_saved());

        flow.begin_request();
        flow.complete_request(suggestion_response(false));
        assert!(!flow.is_snack_saved());
        assert!(flow.begin_save().is_some());
    }

    #[test]
    fn save_without_suggestion_or_selection_is_a_no_op() {
        let mut flow = flow();
        assert!(flow.begin_save().is_none());

        // Suggestion displayed but nothing selected: no target child.
        flow.begin_request();
        flow.complete_request(suggestion_response(false));
        assert!(flow.begin_save().is_none());
    }

    #[test]
    fn dismiss_hides_the_card_locally() {
        let mut flow = flow();
        flow.select(vec![1]);
        flow.begin_request();
        flow.complete_request(suggestion_response(true));
        assert!(flow.suggestion().is_some());

        flow.dismiss();
        assert!(flow.suggestion().is_none());
        assert!(!flow.highlight());

        // A fresh request clears the dismissal.
        flow.begin_request();
        flow.complete_request(suggestion_response(false));
        assert!(flow.suggestion().is_some());
    }

    fn admin() -> AdminFlow {
        AdminFlow::new(SnackApiClient::new(""))
    }

    #[test]
    fn admin_action_while_loading_is_a_no_op() {
        let mut admin = admin();
        assert!(admin.begin_add_child("Maya", "nuts").is_some());
        assert_eq!(admin.action(), &ActionState::Loading);

        assert!(admin.begin_add_child("Leo", "").is_none());
        assert!(admin.begin_delete_child(1).is_none());
    }

    #[test]
    fn successful_add_requests_roster_refresh() {
        let mut admin = admin();
        admin.begin_add_child("Maya", "nuts");
        admin.complete_add_child(HttpResponse::new(
            201,
            r#"{"message":"Child added successfully","child":{"id":1,"name":"Maya","exclusions":"nuts"}}"#,
        ));

        assert!(matches!(admin.action(), ActionState::Success(_)));
        assert!(admin.take_needs_refresh());
        // Draining resets the flag.
        assert!(!admin.take_needs_refresh());
    }

    #[test]
    fn failed_update_surfaces_server_error() {
        let mut admin = admin();
        admin.begin_update_child(9, UpdateChildRequest::default());
        admin.complete_update_child(HttpResponse::new(404, r#"{"error":"Child not found"}"#));

        assert_eq!(
            admin.action(),
            &ActionState::Error("Child not found".to_string())
        );
        assert!(!admin.take_needs_refresh());
    }

    #[test]
    fn delete_snack_marks_snack_list_stale() {
        let mut admin = admin();
        admin.begin_load_snacks(1);
        admin.complete_load_snacks(HttpResponse::new(
            200,
            r#"[{"id":7,"snack":"Apple","image_url":"x"}]"#,
        ));
        assert_eq!(admin.snacks().len(), 1);

        admin.begin_delete_snack(7);
        admin.complete_delete_snack(HttpResponse::new(
            200,
            r#"{"message":"Snack deleted successfully"}"#,
        ));
        assert!(admin.take_snacks_stale());
        assert!(matches!(admin.action(), ActionState::Success(_)));
    }

    #[test]
    fn transport_failure_in_admin_sets_error_state() {
        let mut admin = admin();
        admin.begin_delete_child(1);
        admin.fail_action("Error deleting child. Please try again.");
        assert_eq!(
            admin.action(),
            &ActionState::Error("Error deleting child. Please try again.".to_string())
        );
    }
}
