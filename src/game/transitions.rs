//! Successor generation: every legal next state for one decision point
//!
//! From a given state the player may pass the turn, play a land, cast a
//! spell or activate an ability. Each option that applies yields one or more
//! successor states (more when the effect involves a choice). Options that
//! can't be afforded simply yield nothing.

use crate::core::{Card, Mana};
use crate::game::config::SearchConfig;
use crate::game::logger::SearchLogger;
use crate::game::rules::{RulesRegistry, AMULET_OF_VIGOR, PRIMEVAL_TITAN};
use crate::game::state::GameState;
use crate::loader::CardCatalog;
use crate::zones::CardMultiset;

/// Successor generator bound to a catalog, rules and configuration
///
/// Holds only shared references, so it can be used from many threads at
/// once.
pub struct Transitions<'a> {
    pub catalog: &'a CardCatalog,
    pub rules: &'a RulesRegistry,
    pub config: &'a SearchConfig,
    logger: SearchLogger,
}

impl<'a> Transitions<'a> {
    pub fn new(catalog: &'a CardCatalog, rules: &'a RulesRegistry, config: &'a SearchConfig) -> Self {
        Transitions {
            catalog,
            rules,
            config,
            logger: SearchLogger::new(config.verbosity),
        }
    }

    /// All states reachable from `state` by one decision
    pub fn next_states(&self, state: &GameState) -> Vec<GameState> {
        if state.success {
            return Vec::new();
        }

        let mut state = state.clone();
        if !state.dead_end && state.timed_out(self.config.state_timeout) {
            self.logger
                .verbose(format_args!("timeout on turn {}", state.turn));
            state.log.line_break();
            state.log.text("timeout");
            state.mark_dead_end();
        }

        // Dead lines just wait out the clock so the log stays complete
        if state.dead_end {
            return self.pass_turn(state);
        }

        if let Some(failed) = self.check_for_failure(&state) {
            return failed;
        }

        let mut out = Vec::new();
        let pruning = self.config.pruning;
        let skips_land = pruning.force_land_drops && self.holds_unplayed_land(&state);
        let skips_spell = pruning.force_always_cast && self.holds_castable_must_cast(&state);
        if !skips_land && !skips_spell {
            out.extend(self.pass_turn(state.clone()));
        }

        let hand: Vec<Card> = state.hand.cards().cloned().collect();
        for card in &hand {
            if self.catalog.data(card).is_land() {
                out.extend(self.play(state.clone(), card));
            } else {
                out.extend(self.cast(state.clone(), card));
            }
        }

        let abilities: Vec<Card> = state
            .battlefield
            .cards()
            .filter(|c| self.catalog.data(c).has_ability())
            .cloned()
            .collect();
        for card in &abilities {
            out.extend(self.activate(state.clone(), card));
        }

        out
    }

    /// At the horizon, a hand with no way to the win condition is hopeless
    fn check_for_failure(&self, state: &GameState) -> Option<Vec<GameState>> {
        if state.turn < self.config.horizon {
            return None;
        }
        let has_out = state
            .hand
            .cards()
            .any(|c| self.catalog.data(c).can_be_titan);
        if has_out {
            return None;
        }

        let mut failed = state.clone();
        failed.log.line_break();
        failed.log.text("failed to find ");
        failed.log_card(&Card::new(PRIMEVAL_TITAN), self.catalog);
        failed.mark_dead_end();
        Some(self.pass_turn(failed))
    }

    /// A land drop would go unused: a non-bounce land in hand, a drop left,
    /// and room under the mana ceiling
    ///
    /// Holding a bounce land is fine, replaying karoos can loop forever.
    fn holds_unplayed_land(&self, state: &GameState) -> bool {
        state.land_plays > 0
            && state.mana_pool.total() < self.config.mana_ceiling
            && state.hand.cards().any(|c| {
                let data = self.catalog.data(c);
                data.is_land() && !data.bounce_land
            })
    }

    /// An always-cast spell is in hand and affordable
    fn holds_castable_must_cast(&self, state: &GameState) -> bool {
        state.hand.cards().any(|c| {
            let data = self.catalog.data(c);
            data.always_cast && state.mana_pool.can_pay(data.casting_cost)
        })
    }

    /// Extra land drops granted by permanents on the battlefield
    fn extra_land_drops(&self, battlefield: &CardMultiset) -> u32 {
        battlefield
            .iter()
            .map(|(card, n)| self.catalog.data(card).extra_land_drops * n)
            .sum()
    }

    /// Move to the next turn: untap, pay debts, reset land drops, draw
    pub fn pass_turn(&self, mut state: GameState) -> Vec<GameState> {
        state.turn += 1;
        if state.turn > self.config.horizon {
            state.mark_dead_end();
            return vec![state];
        }

        state.log.line_break();
        state.log.text(&format!("turn {}", state.turn));

        state.mana_pool = state
            .battlefield
            .iter()
            .fold(Mana::zero(), |pool, (card, n)| {
                pool.plus(self.catalog.data(card).taps_for.times(n))
            });
        if !state.mana_pool.is_zero() {
            state.log.text(", ");
            state.log.mana(state.mana_pool);
            state.log.text(" in pool");
        }

        if !state.mana_debt.is_zero() {
            match state.mana_pool.minus(state.mana_debt) {
                Ok(pool) => {
                    state.mana_pool = pool;
                    state.mana_debt = Mana::zero();
                    state.log.text(", pay for pact");
                }
                Err(err) => {
                    self.logger.verbose(format_args!("dropping line: {err}"));
                    return Vec::new();
                }
            }
        }

        state.land_plays = 1 + self.extra_land_drops(&state.battlefield);

        if state.turn > 1 || !state.on_the_play {
            vec![state.draw(1, self.catalog)]
        } else {
            vec![state]
        }
    }

    /// Play a land from hand using a land drop
    pub fn play(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        if state.hand.count(card) == 0
            || state.land_plays == 0
            || state.mana_pool.total() >= self.config.mana_ceiling
        {
            return Vec::new();
        }
        state.land_plays -= 1;
        state.log.line_break();
        state.log.text("play ");
        state.log_card(card, self.catalog);

        if self.catalog.data(card).enters_tapped && !self.rules.enters_untapped_anyway(card, &state) {
            self.enter_tapped(state, card)
        } else {
            self.enter_untapped(state, card)
        }
    }

    /// A tapped land still makes mana once per Amulet of Vigor
    pub fn enter_tapped(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        let amulets = state.battlefield.count(&Card::new(AMULET_OF_VIGOR));
        let taps_for = self.catalog.data(card).taps_for;
        state.mana_pool = state.mana_pool.plus(taps_for.times(amulets));
        self.enter_land(state, card)
    }

    pub fn enter_untapped(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        state.mana_pool = state.mana_pool.plus(self.catalog.data(card).taps_for);
        self.enter_land(state, card)
    }

    fn enter_land(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        state.hand = state.hand.minus([card]);
        state.battlefield = state.battlefield.plus([card]);
        let resolve = self.rules.enter_resolver(card);
        resolve(self, state, card)
    }

    /// Cast a spell from hand, if the pool covers it
    pub fn cast(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        if state.hand.count(card) == 0 {
            return Vec::new();
        }
        let Ok(pool) = state.mana_pool.minus(self.catalog.data(card).casting_cost) else {
            return Vec::new();
        };
        state.mana_pool = pool;
        state.log.line_break();
        state.log.text("cast ");
        state.log_card(card, self.catalog);
        state.hand = state.hand.minus([card]);

        let resolve = self.rules.cast_resolver(card);
        resolve(self, state, card)
    }

    /// Activate a permanent's ability, if the pool covers it
    pub fn activate(&self, mut state: GameState, card: &Card) -> Vec<GameState> {
        if state.battlefield.count(card) == 0 {
            return Vec::new();
        }
        let Ok(pool) = state.mana_pool.minus(self.catalog.data(card).activation_cost) else {
            return Vec::new();
        };
        state.mana_pool = pool;
        state.log.line_break();
        state.log.text("activate ");
        state.log_card(card, self.catalog);

        let resolve = self.rules.activate_resolver(card);
        resolve(self, state, card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::{PruningPolicy, VerbosityLevel};

    struct Fixture {
        catalog: CardCatalog,
        rules: RulesRegistry,
        config: SearchConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                catalog: CardCatalog::builtin().unwrap(),
                rules: RulesRegistry::standard(),
                config: SearchConfig::default().with_verbosity(VerbosityLevel::Silent),
            }
        }

        fn transitions(&self) -> Transitions<'_> {
            Transitions::new(&self.catalog, &self.rules, &self.config)
        }

        /// A state on turn 1 with the given hand, battlefield and pool
        fn state(&self, hand: &[&str], battlefield: &[&str], library: &[&str], pool: Mana) -> GameState {
            let mut state = GameState::new(cards(hand), cards(library), true, &self.catalog);
            state.battlefield = cards(battlefield).into_iter().collect();
            state.mana_pool = pool;
            state.turn = 1;
            state.land_plays = 1;
            state
        }
    }

    fn cards(names: &[&str]) -> Vec<Card> {
        names.iter().map(|&n| Card::new(n)).collect()
    }

    fn card(name: &str) -> Card {
        Card::new(name)
    }

    #[test]
    fn test_pass_turn_taps_out_and_draws() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&[], &["Forest", "Forest", "Simic Growth Chamber"], &["Wastes"], Mana::zero());
        state.turn = 1;

        let next = t.pass_turn(state);
        assert_eq!(next.len(), 1);
        let next = &next[0];
        assert_eq!(next.turn, 2);
        assert_eq!(next.mana_pool, Mana::new(1, 3));
        assert_eq!(next.land_plays, 1);
        assert_eq!(next.hand.count(&card("Wastes")), 1);
    }

    #[test]
    fn test_no_draw_on_turn_one_on_the_play() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&[], &[], &["Wastes"], Mana::zero());
        state.turn = 0;

        let next = t.pass_turn(state.clone()).pop().unwrap();
        assert_eq!(next.turn, 1);
        assert!(next.hand.is_empty());

        state.on_the_play = false;
        let next = t.pass_turn(state).pop().unwrap();
        assert_eq!(next.hand.len(), 1);
    }

    #[test]
    fn test_pass_turn_counts_extra_land_drops() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(
            &[],
            &["Azusa, Lost but Seeking", "Dryad of the Ilysian Grove", "Sakura-Tribe Scout"],
            &["Wastes"],
            Mana::zero(),
        );
        let next = t.pass_turn(state).pop().unwrap();
        assert_eq!(next.land_plays, 5);
    }

    #[test]
    fn test_pass_turn_pays_pact_debt() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&[], &["Forest", "Forest", "Forest", "Forest"], &["Wastes"], Mana::zero());
        state.mana_debt = Mana::new(2, 2);
        let next = t.pass_turn(state.clone()).pop().unwrap();
        assert!(next.mana_debt.is_zero());
        assert!(next.mana_pool.is_zero());
        assert!(next.log.contains_text("pay for pact"));

        // Can't pay: the line is dropped
        state.battlefield = cards(&["Forest"]).into_iter().collect();
        assert!(t.pass_turn(state).is_empty());
    }

    #[test]
    fn test_pass_turn_past_horizon_is_dead_end() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&[], &[], &["Wastes"], Mana::zero());
        state.turn = fx.config.horizon;
        let next = t.pass_turn(state).pop().unwrap();
        assert!(next.dead_end);
        assert_eq!(next.turn, fx.config.horizon + 1);
    }

    #[test]
    fn test_play_untapped_and_tapped_lands() {
        let fx = Fixture::new();
        let t = fx.transitions();

        let state = fx.state(&["Forest"], &[], &[], Mana::zero());
        let next = t.play(state, &card("Forest")).pop().unwrap();
        assert_eq!(next.mana_pool, Mana::green(1));
        assert_eq!(next.land_plays, 0);
        assert_eq!(next.battlefield.count(&card("Forest")), 1);

        let state = fx.state(&["Bojuka Bog"], &[], &[], Mana::zero());
        let next = t.play(state, &card("Bojuka Bog")).pop().unwrap();
        assert!(next.mana_pool.is_zero());

        let state = fx.state(&["Bojuka Bog"], &["Amulet of Vigor", "Amulet of Vigor"], &[], Mana::zero());
        let next = t.play(state, &card("Bojuka Bog")).pop().unwrap();
        assert_eq!(next.mana_pool, Mana::new(2, 0));
    }

    #[test]
    fn test_play_needs_a_land_drop() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&["Forest"], &[], &[], Mana::zero());
        state.land_plays = 0;
        assert!(t.play(state, &card("Forest")).is_empty());
    }

    #[test]
    fn test_castle_enters_untapped_with_forest() {
        let fx = Fixture::new();
        let t = fx.transitions();

        let state = fx.state(&["Castle Garenbrig"], &[], &[], Mana::zero());
        let next = t.play(state, &card("Castle Garenbrig")).pop().unwrap();
        assert!(next.mana_pool.is_zero());

        let state = fx.state(&["Castle Garenbrig"], &["Forest"], &[], Mana::zero());
        let next = t.play(state, &card("Castle Garenbrig")).pop().unwrap();
        assert_eq!(next.mana_pool, Mana::green(1));
    }

    #[test]
    fn test_karoo_bounces_one_branch_per_land() {
        let fx = Fixture::new();
        let t = fx.transitions();

        // No Amulet: the karoo never returns itself
        let state = fx.state(&["Simic Growth Chamber"], &["Forest", "Wastes"], &[], Mana::zero());
        let next = t.play(state, &card("Simic Growth Chamber"));
        assert_eq!(next.len(), 2);
        assert!(next
            .iter()
            .all(|s| s.battlefield.count(&card("Simic Growth Chamber")) == 1));

        // With an Amulet it may pick itself up, and it taps for mana at once
        let state = fx.state(&["Simic Growth Chamber"], &["Forest", "Amulet of Vigor"], &[], Mana::zero());
        let next = t.play(state, &card("Simic Growth Chamber"));
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|s| s.mana_pool == Mana::new(1, 1)));
        assert!(next
            .iter()
            .any(|s| s.hand.count(&card("Simic Growth Chamber")) == 1));
    }

    #[test]
    fn test_karoo_with_nothing_to_bounce_has_no_line() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Simic Growth Chamber"], &[], &[], Mana::zero());
        assert!(t.play(state, &card("Simic Growth Chamber")).is_empty());
    }

    #[test]
    fn test_cast_requires_mana() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Explore"], &[], &["Forest"], Mana::green(1));
        assert!(t.cast(state, &card("Explore")).is_empty());

        let state = fx.state(&["Explore"], &[], &["Forest"], Mana::new(1, 1));
        let next = t.cast(state, &card("Explore")).pop().unwrap();
        assert!(next.mana_pool.is_zero());
        assert_eq!(next.land_plays, 2);
        assert_eq!(next.hand.count(&card("Forest")), 1);
        assert_eq!(next.hand.count(&card("Explore")), 0);
    }

    #[test]
    fn test_titan_marks_success() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Primeval Titan"], &[], &[], Mana::new(4, 2));
        let next = t.cast(state, &card("Primeval Titan")).pop().unwrap();
        assert!(next.success);
        assert!(t.next_states(&next).is_empty());
    }

    #[test]
    fn test_castle_activation_goes_straight_to_titan() {
        let fx = Fixture::new();
        let t = fx.transitions();

        let state = fx.state(&["Primeval Titan"], &["Castle Garenbrig"], &[], Mana::new(2, 1));
        let next = t.activate(state, &card("Castle Garenbrig"));
        assert_eq!(next.len(), 1);
        assert!(next[0].success);

        // No Titan in hand: nothing to spend the burst on
        let state = fx.state(&[], &["Castle Garenbrig"], &[], Mana::new(2, 1));
        assert!(t.activate(state, &card("Castle Garenbrig")).is_empty());
    }

    #[test]
    fn test_pact_fetches_each_creature_once_and_owes_mana() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(
            &["Summoner's Pact", "Arboreal Grazer", "Forest"],
            &[],
            &["Primeval Titan", "Primeval Titan", "Arboreal Grazer", "Sakura-Tribe Scout", "Forest"],
            Mana::new(4, 2),
        );
        let next = t.cast(state, &card("Summoner's Pact"));
        // Titan (once, despite two copies) and Scout; Grazer is already in hand
        assert_eq!(next.len(), 2);
        assert!(next.iter().any(|s| s.success));
        assert!(next.iter().all(|s| s.mana_debt == Mana::new(2, 2)));
    }

    #[test]
    fn test_stirrings_branches_per_colorless_card() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(
            &["Ancient Stirrings"],
            &[],
            &["Forest", "Explore", "Amulet of Vigor", "Forest", "Primeval Titan", "Wastes"],
            Mana::green(1),
        );
        let next = t.cast(state, &card("Ancient Stirrings"));
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|s| s.library.len() == 1));
    }

    #[test]
    fn test_impulse_whiffs() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(
            &["Adventurous Impulse"],
            &[],
            &["Explore", "Amulet of Vigor", "Explore"],
            Mana::green(1),
        );
        let next = t.cast(state, &card("Adventurous Impulse"));
        assert_eq!(next.len(), 1);
        assert!(next[0].log.contains_text("whiff"));
        assert!(next[0].library.is_empty());
    }

    #[test]
    fn test_harvest_reveals_until_hit() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(
            &["Abundant Harvest"],
            &[],
            &["Explore", "Explore", "Forest", "Primeval Titan"],
            Mana::green(1),
        );
        let next = t.cast(state, &card("Abundant Harvest"));
        assert_eq!(next.len(), 2);

        let land = next.iter().find(|s| s.log.contains_text("choose land")).unwrap();
        assert_eq!(land.hand.count(&card("Forest")), 1);
        assert_eq!(land.library.len(), 1);

        let nonland = next.iter().find(|s| s.log.contains_text("choose nonland")).unwrap();
        assert_eq!(nonland.hand.count(&card("Explore")), 1);
        assert_eq!(nonland.library.len(), 3);
    }

    #[test]
    fn test_harvest_with_no_match_reveals_everything() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Abundant Harvest"], &[], &["Explore", "Explore"], Mana::green(1));
        let next = t.cast(state, &card("Abundant Harvest"));
        let land = next.iter().find(|s| s.log.contains_text("choose land")).unwrap();
        assert!(land.library.is_empty());
        assert!(land.hand.is_empty());
    }

    #[test]
    fn test_grazer_puts_land_tapped_without_land_drop() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Arboreal Grazer", "Bojuka Bog", "Forest"], &[], &[], Mana::green(1));
        let next = t.cast(state, &card("Arboreal Grazer"));
        assert_eq!(next.len(), 2);
        assert!(next.iter().all(|s| s.land_plays == 1));
        assert!(next.iter().all(|s| s.mana_pool.is_zero()));
        assert!(next
            .iter()
            .all(|s| s.battlefield.count(&card("Arboreal Grazer")) == 1));
    }

    #[test]
    fn test_spirit_guide_not_before_turn_one() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&["Elvish Spirit Guide"], &[], &[], Mana::zero());
        state.turn = 0;
        assert!(t.cast(state.clone(), &card("Elvish Spirit Guide")).is_empty());

        state.turn = 1;
        let next = t.cast(state, &card("Elvish Spirit Guide")).pop().unwrap();
        assert_eq!(next.mana_pool, Mana::green(1));
    }

    #[test]
    fn test_forced_land_drop_suppresses_pass() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Forest"], &[], &["Wastes"], Mana::zero());
        let next = t.next_states(&state);
        assert!(next.iter().all(|s| s.turn == 1));

        let mut config = SearchConfig::default().with_pruning(PruningPolicy::none());
        config.verbosity = VerbosityLevel::Silent;
        let relaxed = Transitions::new(&fx.catalog, &fx.rules, &config);
        let next = relaxed.next_states(&state);
        assert!(next.iter().any(|s| s.turn == 2));
    }

    #[test]
    fn test_bounce_land_is_exempt_from_forced_drop() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Simic Growth Chamber"], &[], &["Wastes"], Mana::zero());
        assert!(t.next_states(&state).iter().any(|s| s.turn == 2));
    }

    #[test]
    fn test_forced_cast_suppresses_pass() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let state = fx.state(&["Ancient Stirrings"], &[], &["Wastes"], Mana::green(1));
        assert!(t.next_states(&state).iter().all(|s| s.turn == 1));

        // Unaffordable: passing is fine
        let state = fx.state(&["Ancient Stirrings"], &[], &["Wastes"], Mana::zero());
        assert!(t.next_states(&state).iter().any(|s| s.turn == 2));
    }

    #[test]
    fn test_failure_check_at_horizon() {
        let fx = Fixture::new();
        let t = fx.transitions();
        let mut state = fx.state(&["Explore", "Forest"], &[], &["Wastes"], Mana::zero());
        state.turn = fx.config.horizon;
        let next = t.next_states(&state);
        assert_eq!(next.len(), 1);
        assert!(next[0].dead_end);
        assert!(next[0].log.contains_text("failed to find "));

        // Holding a Pact keeps the line alive
        let mut state = fx.state(&["Summoner's Pact", "Forest"], &[], &["Wastes"], Mana::zero());
        state.turn = fx.config.horizon;
        assert!(t.next_states(&state).iter().all(|s| !s.dead_end));
    }

    #[test]
    fn test_timeout_marks_dead_end() {
        let fx = Fixture::new();
        let config = SearchConfig::default()
            .with_state_timeout(std::time::Duration::ZERO)
            .with_verbosity(VerbosityLevel::Silent);
        let t = Transitions::new(&fx.catalog, &fx.rules, &config);
        let state = fx.state(&["Forest", "Explore"], &[], &["Wastes"], Mana::zero());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let next = t.next_states(&state);
        assert_eq!(next.len(), 1);
        assert!(next[0].dead_end);
        assert!(next[0].log.contains_text("timeout"));
    }
}
