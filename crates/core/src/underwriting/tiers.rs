use crate::domain::customer::LoanOffer;

/// Picks the rate of the first offer large enough for the requested amount.
pub fn select_interest_rate(offers: &[LoanOffer], requested_amount: f64, default_rate: f64) -> f64 {
    offers
        .iter()
        .find(|offer| offer.max_amount >= requested_amount)
        .map(|offer| offer.interest_rate)
        .unwrap_or(default_rate)
}

#[cfg(test)]
mod tests {
    use super::select_interest_rate;
    use crate::domain::customer::LoanOffer;

    fn offer(tier: &str, max_amount: f64, interest_rate: f64) -> LoanOffer {
        LoanOffer {
            tier: tier.to_owned(),
            max_amount,
            interest_rate,
            tenure_options: vec![12, 24, 36],
            processing_fee: 0.0,
            features: Vec::new(),
        }
    }

    #[test]
    fn first_sufficient_offer_wins() {
        let offers = [
            offer("Instant Approval", 100_000.0, 11.5),
            offer("Enhanced Offer", 200_000.0, 11.25),
        ];
        assert_eq!(select_interest_rate(&offers, 80_000.0, 12.5), 11.5);
        assert_eq!(select_interest_rate(&offers, 100_000.0, 12.5), 11.5);
        assert_eq!(select_interest_rate(&offers, 150_000.0, 12.5), 11.25);
    }

    #[test]
    fn falls_back_to_default_rate() {
        let offers = [offer("Instant Approval", 100_000.0, 11.5)];
        assert_eq!(select_interest_rate(&offers, 250_000.0, 12.5), 12.5);
        assert_eq!(select_interest_rate(&[], 10_000.0, 12.5), 12.5);
    }
}
