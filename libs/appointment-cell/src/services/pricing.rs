use rust_decimal::Decimal;

use crate::error::AppointmentError;
use crate::models::{Appointment, PaymentStatus, UpdateChargesRequest};

pub fn total_cost(consultation_fee: Decimal, additional_charges: Decimal, discount_amount: Decimal) -> Decimal {
    consultation_fee + additional_charges - discount_amount
}

pub fn recompute_total(appointment: &mut Appointment) {
    appointment.total_cost = total_cost(
        appointment.consultation_fee,
        appointment.additional_charges,
        appointment.discount_amount,
    );
}

/// Applies new charges or discount and recomputes the total.
pub fn apply_charges(appointment: &mut Appointment, request: &UpdateChargesRequest) -> Result<(), AppointmentError> {
    let additional_charges = request.additional_charges.unwrap_or(appointment.additional_charges);
    let discount_amount = request.discount_amount.unwrap_or(appointment.discount_amount);

    if additional_charges < Decimal::ZERO {
        return Err(AppointmentError::Validation("additional_charges must not be negative".to_string()));
    }
    if discount_amount < Decimal::ZERO {
        return Err(AppointmentError::Validation("discount_amount must not be negative".to_string()));
    }

    let total = total_cost(appointment.consultation_fee, additional_charges, discount_amount);
    if total < Decimal::ZERO {
        return Err(AppointmentError::Validation("discount exceeds the appointment cost".to_string()));
    }

    appointment.additional_charges = additional_charges;
    appointment.discount_amount = discount_amount;
    appointment.total_cost = total;
    Ok(())
}

/// Payment status after `paid` has been received against `total`.
pub fn payment_status(current: PaymentStatus, total: Decimal, paid: Decimal) -> PaymentStatus {
    if paid <= Decimal::ZERO {
        current
    } else if paid >= total {
        PaymentStatus::Paid
    } else {
        PaymentStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn total_is_fee_plus_charges_minus_discount() {
        assert_eq!(total_cost(d("1500.00"), d("200.00"), d("100.00")), d("1600.00"));
    }

    #[test]
    fn payment_status_follows_the_sum() {
        assert_eq!(payment_status(PaymentStatus::Pending, d("100"), d("0")), PaymentStatus::Pending);
        assert_eq!(payment_status(PaymentStatus::Pending, d("100"), d("40")), PaymentStatus::Partial);
        assert_eq!(payment_status(PaymentStatus::Partial, d("100"), d("100")), PaymentStatus::Paid);
        assert_eq!(payment_status(PaymentStatus::Pending, d("100"), d("120")), PaymentStatus::Paid);
    }
}
