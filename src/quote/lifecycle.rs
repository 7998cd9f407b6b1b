use tokio::time::Instant;

use crate::error::{ValidationError, WalletError};
use crate::quote::types::{Quote, QuoteParams};

#[derive(Debug, Clone, PartialEq)]
pub enum QuoteState {
    Idle,
    Fetching,
    Quoted(Quote),
    /// Countdown ran out or the quote was invalidated; keeps the last quote for display
    Expired(Option<Quote>),
    Error(WalletError),
}

/// Outcome of one quote request as seen by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteUpdate {
    Quoted(Quote),
    Failed(WalletError),
    /// A newer request or an invalidation replaced this one; its result was dropped
    Superseded,
    Invalid(ValidationError),
}

/// Permission to apply the result of one fetch, tied to the generation it was issued for
#[derive(Debug)]
pub struct QuoteTicket {
    generation: u64,
    params: QuoteParams,
}

impl QuoteTicket {
    pub fn params(&self) -> &QuoteParams {
        &self.params
    }
}

/// Synchronous quote state machine.
///
/// Every parameter edit, invalidation or manual refresh bumps `generation`;
/// results carrying an older generation are discarded.
#[derive(Debug)]
pub struct QuoteLifecycle {
    params: Option<QuoteParams>,
    state: QuoteState,
    generation: u64,
}

impl Default for QuoteLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteLifecycle {
    pub fn new() -> Self {
        Self {
            params: None,
            state: QuoteState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &QuoteState {
        &self.state
    }

    pub fn params(&self) -> Option<&QuoteParams> {
        self.params.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record new parameters. Drops any current quote and returns the new generation.
    pub fn set_params(&mut self, params: QuoteParams) -> u64 {
        self.generation += 1;
        self.params = Some(params);
        self.state = QuoteState::Idle;
        self.generation
    }

    /// Keep the current parameters but start over, as the "Refresh Rate" action does
    pub fn restart(&mut self) -> Option<u64> {
        self.params.as_ref()?;
        self.generation += 1;
        self.state = QuoteState::Idle;
        Some(self.generation)
    }

    /// Move to `Fetching` if `generation` is still current
    pub fn begin_fetch(&mut self, generation: u64) -> Option<QuoteTicket> {
        if generation != self.generation {
            return None;
        }
        let params = self.params.clone()?;
        self.state = QuoteState::Fetching;
        Some(QuoteTicket { generation, params })
    }

    /// Apply a fetch result unless a newer generation has started since the ticket was issued
    pub fn complete(&mut self, ticket: QuoteTicket, result: Result<Quote, WalletError>) -> QuoteUpdate {
        if ticket.generation != self.generation {
            log::debug!(
                "Discarding stale quote response (generation {} < {})",
                ticket.generation,
                self.generation
            );
            return QuoteUpdate::Superseded;
        }
        match result {
            Ok(quote) => {
                log::info!(
                    "Quote {} received: {} -> {}",
                    quote.quote_id.as_deref().unwrap_or("-"),
                    quote.from_amount,
                    quote.to_amount
                );
                self.state = QuoteState::Quoted(quote.clone());
                QuoteUpdate::Quoted(quote)
            }
            Err(e) => {
                log::warn!("Quote request failed: {}", e);
                self.state = QuoteState::Error(e.clone());
                QuoteUpdate::Failed(e)
            }
        }
    }

    /// Countdown step. Returns the seconds left on the active quote, or `None`
    /// when `generation` no longer owns the countdown or no quote is live.
    pub fn tick(&mut self, generation: u64, now: Instant) -> Option<u64> {
        if generation != self.generation {
            return None;
        }
        let remaining = match &self.state {
            QuoteState::Quoted(quote) => quote.seconds_left(now),
            _ => return None,
        };
        if remaining == 0 {
            self.expire();
        }
        Some(remaining)
    }

    /// Forget parameters and quote. The generation keeps counting so results
    /// of fetches issued before the reset are still discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.params = None;
        self.state = QuoteState::Idle;
    }

    /// Expire the active quote immediately and cancel any in-flight fetch
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.expire();
    }

    fn expire(&mut self) {
        let last = match std::mem::replace(&mut self.state, QuoteState::Idle) {
            QuoteState::Quoted(quote) => Some(quote),
            QuoteState::Expired(last) => last,
            _ => None,
        };
        log::info!("Quote expired");
        self.state = QuoteState::Expired(last);
    }

    /// The quote a transfer may be authorized with at `now`
    pub fn usable_quote(&mut self, now: Instant) -> Result<&Quote, ValidationError> {
        if let QuoteState::Quoted(quote) = &self.state {
            if !quote.is_valid_at(now) {
                self.expire();
            }
        }
        match &self.state {
            QuoteState::Quoted(quote) => Ok(quote),
            QuoteState::Expired(_) => Err(ValidationError::QuoteExpired),
            _ => Err(ValidationError::NoQuote),
        }
    }
}
