use hideaway_db::models::{NotificationType, Reservation};

fn display_date(reservation: &Reservation) -> String {
    reservation.date.format("%A, %B %-d, %Y").to_string()
}

fn guests_line(reservation: &Reservation) -> String {
    format!("Guests: {}", reservation.number_of_guests)
}

/// Text pushed to the guest for a reservation event.
pub fn reservation_message(kind: NotificationType, reservation: &Reservation) -> String {
    let date = display_date(reservation);
    match kind {
        NotificationType::ReservationConfirmed => {
            let mut text = format!(
                "[Reservation confirmed]\nThank you for your reservation!\n\nDate: {date}\n{}\n",
                guests_line(reservation)
            );
            if !reservation.notes.is_empty() {
                text.push_str(&format!("Notes: {}\n", reservation.notes));
            }
            text.push_str("\nYou can change or cancel it from your reservations page.");
            text
        }
        NotificationType::ReservationReminder => format!(
            "[Reservation reminder]\nYour reservation is tomorrow!\n\nDate: {date}\n{}\n\nWe look forward to seeing you.",
            guests_line(reservation)
        ),
        NotificationType::ReservationCancelled => format!(
            "[Reservation cancelled]\nYour reservation has been cancelled.\n\nCancelled date: {date}\n\nWe hope to see you again soon."
        ),
        NotificationType::ReservationUpdated => format!(
            "[Reservation updated]\nYour reservation has been changed.\n\nNew date: {date}\n{}",
            guests_line(reservation)
        ),
        NotificationType::InvitationApproved => approval_message(),
    }
}

pub fn approval_message() -> String {
    "[Membership approved]\nYour account has been approved!\n\nYou can now make reservations from your reservations page.".to_string()
}
