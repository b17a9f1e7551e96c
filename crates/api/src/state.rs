use std::sync::Arc;

use hideaway_config::{IdentityProvider, Settings};
use hideaway_services::{
    InvitationLedger, NotificationDispatcher, ReservationEngine, SlotCalendar, Stores,
    UserDirectory, VenueClock,
    identity::{IdentityGateway, JwtIdentityGateway, LineIdentityGateway},
    notification::{DisabledSender, LinePushSender, NotificationSender},
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub identity: Arc<dyn IdentityGateway>,
    pub users: Arc<UserDirectory>,
    pub invitations: Arc<InvitationLedger>,
    pub slots: Arc<SlotCalendar>,
    pub reservations: Arc<ReservationEngine>,
    pub notifications: Arc<NotificationDispatcher>,
}

impl AppState {
    /// Wires the services with the identity provider and push channel
    /// named in `settings`.
    pub fn new(stores: Stores, settings: Settings) -> Self {
        let identity: Arc<dyn IdentityGateway> = match settings.identity.provider {
            IdentityProvider::Jwt => Arc::new(JwtIdentityGateway::new(
                &settings.identity.jwt_secret,
                settings.identity.jwt_issuer.clone(),
            )),
            IdentityProvider::Line => Arc::new(LineIdentityGateway::new(
                settings.identity.line_verify_url.clone(),
                settings.identity.line_channel_id.clone(),
            )),
        };

        let sender: Arc<dyn NotificationSender> = match &settings.line.channel_access_token {
            Some(token) if !token.is_empty() => Arc::new(LinePushSender::new(
                settings.line.push_url.clone(),
                Some(token.clone()),
            )),
            _ => Arc::new(DisabledSender),
        };

        Self::with_providers(stores, settings, identity, sender)
    }

    pub fn with_providers(
        stores: Stores,
        settings: Settings,
        identity: Arc<dyn IdentityGateway>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        let notifications = Arc::new(NotificationDispatcher::new(
            sender,
            stores.notifications.clone(),
        ));
        let users = Arc::new(UserDirectory::new(
            stores.users.clone(),
            notifications.clone(),
            settings.venue.owner_subject_id.clone(),
        ));
        let invitations = Arc::new(InvitationLedger::new(
            stores.invitations.clone(),
            users.clone(),
            settings.invitation.code_length,
            settings.app.base_url.clone(),
        ));
        let slots = Arc::new(SlotCalendar::new(
            stores.slots.clone(),
            stores.reservations.clone(),
            users.clone(),
            chrono::Duration::try_seconds(settings.venue.reconcile_grace_seconds.max(0))
                .unwrap_or_else(chrono::Duration::zero),
        ));
        let reservations = Arc::new(ReservationEngine::new(
            stores.reservations.clone(),
            slots.clone(),
            users.clone(),
            notifications.clone(),
            VenueClock::new(settings.venue.utc_offset_minutes),
        ));

        Self {
            settings,
            identity,
            users,
            invitations,
            slots,
            reservations,
            notifications,
        }
    }
}
