use crate::core::consultation::Consultation;
use crate::core::response::ResponseDraft;
use crate::core::review::{ReviewDraft, encode_all};
use crate::message::{Message, Screen};
use crate::remote::{PortalClient, SubmissionPayload};
use crate::session::{KeyValueStore, SessionStore};

/// Token-mode launch data taken from the emailed portal link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub token: String,
    pub requested_id: Option<String>,
}

/// Consultation-id query aliases, in precedence order.
const CONSULT_ID_ALIASES: &[&str] = &["idConsult", "consultId", "ConsultID", "idConsultation"];

/// Extract token-mode launch data from a portal URL. A URL without a
/// non-empty `token` parameter launches in credential mode.
pub fn parse_launch_url(input: &str) -> Option<LaunchRequest> {
    let url = url::Url::parse(input).ok()?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let token = pairs
        .iter()
        .find(|(k, v)| k == "token" && !v.is_empty())
        .map(|(_, v)| v.clone())?;
    let requested_id = CONSULT_ID_ALIASES.iter().find_map(|alias| {
        pairs
            .iter()
            .find(|(k, v)| k == alias && !v.is_empty())
            .map(|(_, v)| v.clone())
    });

    Some(LaunchRequest {
        token,
        requested_id,
    })
}

/// Authentication progress, modeled as one state instead of a pile of
/// booleans so "logging in while already logged in" cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Idle,
    /// A persisted credential pair was found and is being replayed.
    Restoring,
    AwaitingInput,
    Authenticating,
    Authenticated,
    Failed(String),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    fn in_flight(&self) -> bool {
        matches!(self, Self::Restoring | Self::Authenticating)
    }
}

/// Deferred work the runner executes on the async runtime. Completion feeds
/// back into `Portal::update` as a message.
#[derive(Debug)]
pub enum Effect {
    FetchByToken {
        token: String,
        requested_id: Option<String>,
    },
    FetchByCredentials {
        dfe: String,
        code: String,
    },
    SubmitResponse {
        id: String,
        payload: Box<SubmissionPayload>,
    },
    SubmitReview {
        draft: ReviewDraft,
    },
}

/// The view controller: owns session and repository state and decides which
/// screen is visible. Forms communicate only through messages.
pub struct Portal<S: KeyValueStore> {
    sessions: SessionStore<S>,
    pub auth: AuthState,
    pub dfe_input: String,
    pub school_code_input: String,
    pub launch: Option<LaunchRequest>,
    pub consultations: Vec<Consultation>,
    pub selected_id: Option<String>,
    pub portal_setting_name: String,
    pub screen: Screen,
    pub response_form: ResponseDraft,
    pub review_form: ReviewDraft,
    pub submitting: bool,
    /// Inline error for the active form; persistent until the next
    /// successful action.
    pub submit_message: String,
}

impl<S: KeyValueStore> Portal<S> {
    /// Build the controller and the launch effect. Token presence decides
    /// the mode once per load; with no token a persisted credential pair
    /// becomes an implicit login attempt.
    pub fn new(sessions: SessionStore<S>, launch: Option<LaunchRequest>) -> (Self, Option<Effect>) {
        let mut portal = Self {
            sessions,
            auth: AuthState::Idle,
            dfe_input: String::new(),
            school_code_input: String::new(),
            launch,
            consultations: Vec::new(),
            selected_id: None,
            portal_setting_name: String::new(),
            screen: Screen::Home,
            response_form: ResponseDraft::default(),
            review_form: ReviewDraft::default(),
            submitting: false,
            submit_message: String::new(),
        };

        if let Some(launch) = portal.launch.clone() {
            portal.screen = Screen::Consultations;
            portal.auth = AuthState::Authenticating;
            let effect = Effect::FetchByToken {
                token: launch.token,
                requested_id: launch.requested_id,
            };
            return (portal, Some(effect));
        }

        if let Some(saved) = portal.sessions.load() {
            portal.dfe_input = saved.dfe.clone();
            portal.school_code_input = saved.school_code.clone();
            portal.auth = AuthState::Restoring;
            let effect = Effect::FetchByCredentials {
                dfe: saved.dfe,
                code: saved.school_code,
            };
            return (portal, Some(effect));
        }

        portal.auth = AuthState::AwaitingInput;
        (portal, None)
    }

    pub fn token_mode(&self) -> bool {
        self.launch.is_some()
    }

    pub fn show_login(&self) -> bool {
        !self.token_mode() && !self.auth.is_authenticated()
    }

    pub fn selected_consultation(&self) -> Option<&Consultation> {
        let id = self.selected_id.as_deref()?;
        self.consultations.iter().find(|c| c.id == id)
    }

    pub fn update(&mut self, message: Message) -> Option<Effect> {
        match message {
            Message::SetScreen(screen) => {
                self.screen = screen;
                self.selected_id = None;
                self.submit_message.clear();
                None
            }

            Message::DfeChanged(value) => {
                if !self.auth.in_flight() {
                    self.dfe_input = value;
                }
                None
            }
            Message::SchoolCodeChanged(value) => {
                if !self.auth.in_flight() {
                    self.school_code_input = value;
                }
                None
            }
            Message::LoginSubmit => self.login_submit(),
            Message::LoginCompleted(result) => {
                self.login_completed(result);
                None
            }
            Message::Logout => {
                self.logout();
                None
            }

            Message::TokenFetchCompleted(result) => {
                self.token_fetch_completed(result);
                None
            }

            Message::SelectConsultation(id) => {
                if self.consultations.iter().any(|c| c.id == id) {
                    self.selected_id = Some(id);
                    self.submit_message.clear();
                }
                None
            }
            Message::BackToList => {
                // Token mode pins the view to its single consultation.
                if !self.token_mode() {
                    self.selected_id = None;
                    self.response_form.reset();
                    self.submit_message.clear();
                }
                None
            }

            Message::SetSuitableSetting(choice) => {
                self.response_form.suitable_setting = Some(choice);
                None
            }
            Message::SetAttendanceIncompatible(choice) => {
                self.response_form.attendance_incompatible = Some(choice);
                None
            }
            Message::SuitableReasoningChanged(v) => {
                self.response_form.suitable_reasoning = v;
                None
            }
            Message::AttendanceReasoningChanged(v) => {
                self.response_form.attendance_reasoning = v;
                None
            }
            Message::ProposedStartDateChanged(v) => {
                self.response_form.proposed_start_date = v;
                None
            }
            Message::BandingOrFundingChanged(v) => {
                self.response_form.banding_or_funding = v;
                None
            }
            Message::AdditionalInfoChanged(v) => {
                self.response_form.additional_info = v;
                None
            }
            Message::ResponderNameChanged(v) => {
                self.response_form.responder_name = v;
                None
            }
            Message::ResponderRoleChanged(v) => {
                self.response_form.responder_role = v;
                None
            }
            Message::ClearResponseForm => {
                if !self.submitting {
                    self.response_form.reset();
                    self.submit_message.clear();
                }
                None
            }
            Message::SubmitResponse => self.submit_response(),
            Message::ResponseSubmitted(result) => {
                self.response_submitted(result);
                None
            }

            Message::ReviewImpulseIdChanged(v) => {
                self.review_form.impulse_id = v;
                None
            }
            Message::ReviewDobChanged(v) => {
                self.review_form.dob = v;
                None
            }
            Message::ReviewDateChanged(v) => {
                self.review_form.review_date = v;
                None
            }
            Message::ReviewRecommendationChanged(v) => {
                self.review_form.recommendation =
                    crate::core::review::Recommendation::from_str(v.trim());
                None
            }
            Message::AddAttachment(path) => {
                if self.submitting {
                    return None;
                }
                match self.review_form.add_file(&path) {
                    Ok(true) => {}
                    Ok(false) => log::info!("Skipped duplicate attachment {}", path.display()),
                    Err(e) => self.submit_message = e.to_string(),
                }
                None
            }
            Message::RemoveAttachment(index) => {
                if !self.submitting {
                    self.review_form.remove_attachment(index);
                }
                None
            }
            Message::SubmitReview => self.submit_review(),
            Message::ReviewSubmitted(result) => {
                self.review_submitted(result);
                None
            }
        }
    }

    fn login_submit(&mut self) -> Option<Effect> {
        if self.auth.in_flight() || self.auth.is_authenticated() {
            return None;
        }
        let dfe = self.dfe_input.trim().to_string();
        let code = self.school_code_input.trim().to_string();
        if dfe.is_empty() || code.is_empty() {
            self.auth =
                AuthState::Failed("Please enter both DfE number and login code.".to_string());
            return None;
        }
        self.dfe_input = dfe.clone();
        self.school_code_input = code.clone();
        self.auth = AuthState::Authenticating;
        Some(Effect::FetchByCredentials { dfe, code })
    }

    fn login_completed(&mut self, result: Result<Vec<Consultation>, String>) {
        match result {
            Ok(consultations) => {
                self.portal_setting_name = consultations
                    .first()
                    .map(|c| c.setting_name.clone())
                    .unwrap_or_default();
                self.consultations = consultations;
                self.auth = AuthState::Authenticated;
                self.sessions
                    .save(&self.dfe_input, &self.school_code_input);
                self.submit_message.clear();
            }
            Err(message) => {
                log::warn!("Login failed: {}", message);
                self.sessions.clear();
                self.consultations.clear();
                self.auth = AuthState::Failed(message);
            }
        }
    }

    fn token_fetch_completed(&mut self, result: Result<Vec<Consultation>, String>) {
        match result {
            Ok(consultations) => {
                let requested = self
                    .launch
                    .as_ref()
                    .and_then(|l| l.requested_id.as_deref())
                    .unwrap_or("")
                    .trim()
                    .to_string();
                let chosen = if requested.is_empty() {
                    consultations.first().cloned()
                } else {
                    consultations
                        .iter()
                        .find(|c| c.id_consult.trim() == requested)
                        .cloned()
                };
                // No match for the requested id: present everything returned.
                let visible = match chosen {
                    Some(c) => vec![c],
                    None => consultations,
                };
                self.portal_setting_name = visible
                    .first()
                    .map(|c| c.setting_name.clone())
                    .unwrap_or_default();
                self.selected_id = visible.first().map(|c| c.id.clone());
                self.consultations = visible;
                self.auth = AuthState::Authenticated;
                self.screen = Screen::Consultations;
            }
            Err(message) => {
                log::warn!("Token prefill failed: {}", message);
                self.auth = AuthState::Failed(message);
            }
        }
    }

    fn logout(&mut self) {
        // Token mode carries no session to log out of.
        if self.token_mode() {
            return;
        }
        self.sessions.clear();
        self.auth = AuthState::AwaitingInput;
        self.dfe_input.clear();
        self.school_code_input.clear();
        self.consultations.clear();
        self.selected_id = None;
        self.portal_setting_name.clear();
        self.screen = Screen::Home;
        self.response_form.reset();
        self.review_form.reset();
        self.submit_message.clear();
        log::info!("Logged out");
    }

    fn submit_response(&mut self) -> Option<Effect> {
        if self.submitting {
            return None;
        }
        let Some(consultation) = self.selected_consultation() else {
            self.submit_message = "Please complete all required fields.".to_string();
            return None;
        };
        if !self.response_form.is_complete() {
            self.submit_message = "Please complete all required fields.".to_string();
            return None;
        }
        let payload = SubmissionPayload::ConsultationResponse(
            self.response_form.build_payload(consultation),
        );
        let id = consultation.id.clone();
        self.submitting = true;
        self.submit_message.clear();
        Some(Effect::SubmitResponse {
            id,
            payload: Box::new(payload),
        })
    }

    fn response_submitted(&mut self, result: Result<String, String>) {
        self.submitting = false;
        match result {
            Ok(id) => {
                self.consultations.retain(|c| c.id != id);
                self.selected_id = None;
                self.response_form.reset();
                self.submit_message.clear();
                log::info!("Consultation response submitted for {}", id);
            }
            Err(message) => self.submit_message = message,
        }
    }

    fn submit_review(&mut self) -> Option<Effect> {
        if self.submitting {
            return None;
        }
        if !self.review_form.is_complete() {
            self.submit_message =
                "Please complete all required fields and add at least one attachment.".to_string();
            return None;
        }
        self.submitting = true;
        self.submit_message.clear();
        Some(Effect::SubmitReview {
            draft: self.review_form.clone(),
        })
    }

    fn review_submitted(&mut self, result: Result<(), String>) {
        self.submitting = false;
        match result {
            Ok(()) => {
                self.review_form.reset();
                self.submit_message.clear();
                self.screen = Screen::Home;
                log::info!("Annual review submitted");
            }
            Err(message) => self.submit_message = message,
        }
    }
}

/// Run one effect to completion and return its follow-up message.
pub async fn perform(client: &PortalClient, effect: Effect) -> Message {
    match effect {
        Effect::FetchByToken {
            token,
            requested_id,
        } => {
            let result = client
                .fetch_by_token(&token, requested_id.as_deref())
                .await
                .map_err(|e| e.to_string());
            Message::TokenFetchCompleted(result)
        }
        Effect::FetchByCredentials { dfe, code } => {
            let result = client
                .fetch_by_credentials(&dfe, &code)
                .await
                .map_err(|e| e.to_string());
            Message::LoginCompleted(result)
        }
        Effect::SubmitResponse { id, payload } => {
            let result = client
                .submit(&payload)
                .await
                .map(|_| id)
                .map_err(|e| e.to_string());
            Message::ResponseSubmitted(result)
        }
        Effect::SubmitReview { draft } => {
            let result = async {
                let encoded = encode_all(&draft.attachments)
                    .await
                    .map_err(|e| e.to_string())?;
                let payload = SubmissionPayload::AnnualReview(draft.build_payload(encoded));
                client.submit(&payload).await.map_err(|e| e.to_string())?;
                Ok(())
            }
            .await;
            Message::ReviewSubmitted(result)
        }
    }
}
