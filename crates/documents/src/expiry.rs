//! Lazy, read-time expiry.
//!
//! Expiry is a derived property, not a stored transition: there is no
//! background job flipping documents over. Every read and every guard applies
//! this predicate with the single "now" of the request, so a document cannot
//! flicker between expired and non-expired mid-operation.

use chrono::{DateTime, Utc};

use crate::document::{DocumentStatus, SalesDocument};

/// True iff the document is awaiting customer response or delivery and its
/// validity deadline has passed.
pub fn is_expired(doc: &SalesDocument, now: DateTime<Utc>) -> bool {
    matches!(
        doc.status(),
        DocumentStatus::Sent | DocumentStatus::Accepted | DocumentStatus::Delivered
    ) && doc.valid_until().is_some_and(|deadline| now.date_naive() > deadline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentKind, NewDocument, NewLineItem};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use salesdoc_core::{CurrencyId, CustomerId, DocumentId, ProductId, StoreId, UserId};

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    fn sent_with_deadline(valid_until: Option<chrono::NaiveDate>) -> SalesDocument {
        let mut doc = SalesDocument::create(
            NewDocument {
                id: DocumentId::new(),
                kind: DocumentKind::Quote,
                ref_number: "PI-0002".to_string(),
                document_date: test_time().date_naive(),
                customer_id: CustomerId::new(),
                store_id: StoreId::new(),
                currency_id: CurrencyId::new(),
                line_items: vec![NewLineItem {
                    product_id: ProductId::new(),
                    quantity: 1,
                    unit_price: dec!(50.00),
                }],
                valid_until,
            },
            CurrencyId::new(),
            dec!(1.000000),
            UserId::new(),
            test_time(),
        )
        .unwrap();
        doc.send(UserId::new(), test_time()).unwrap();
        doc
    }

    #[test]
    fn not_expired_on_the_deadline_day() {
        let deadline = test_time().date_naive() + Duration::days(3);
        let doc = sent_with_deadline(Some(deadline));

        let on_deadline = test_time() + Duration::days(3);
        assert!(!is_expired(&doc, on_deadline));
        let day_after = test_time() + Duration::days(4);
        assert!(is_expired(&doc, day_after));
    }

    #[test]
    fn documents_without_deadline_never_expire() {
        let doc = sent_with_deadline(None);
        assert!(!is_expired(&doc, test_time() + Duration::days(3650)));
    }

    #[test]
    fn drafts_do_not_expire() {
        let mut doc = sent_with_deadline(Some(test_time().date_naive() + Duration::days(1)));
        // Regress to draft via reopen after the deadline passes.
        let late = test_time() + Duration::days(10);
        doc.reopen(UserId::new(), late, late.date_naive() + Duration::days(5))
            .unwrap();

        // Push past even the new deadline: a draft still never reads expired.
        let much_later = late + Duration::days(30);
        assert!(!is_expired(&doc, much_later));
        assert_eq!(doc.effective_status(much_later), DocumentStatus::Draft);
    }
}
