//! Per-card rules, registered once and looked up by card
//!
//! Each card in the pool registers the resolvers it needs: what happens when
//! it is cast, when it enters the battlefield as a land, and when its
//! activated ability resolves. A resolver is a plain function from a state
//! to every state the effect can lead to; player choices become one
//! successor per option.

use crate::core::{Card, Mana};
use crate::game::state::GameState;
use crate::game::transitions::Transitions;
use crate::loader::CardCatalog;
use crate::zones::CardMultiset;
use crate::{Result, SequencerError};
use rustc_hash::{FxHashMap, FxHashSet};

pub const PRIMEVAL_TITAN: &str = "Primeval Titan";
pub const AMULET_OF_VIGOR: &str = "Amulet of Vigor";
pub const FOREST: &str = "Forest";

/// Deferred cost of Summoner's Pact, paid at the start of the next turn
const PACT_DEBT: Mana = Mana::new(2, 2);
/// Castle Garenbrig's burst, only ever spent on the win condition
const CASTLE_BURST: Mana = Mana::green(6);

/// Resolve an effect of `card` on `state`, returning every outcome
pub type Resolver = fn(&Transitions<'_>, GameState, &Card) -> Vec<GameState>;

/// Battlefield condition under which a normally-tapped land enters untapped
pub type UntappedIf = fn(&GameState) -> bool;

/// The rules one card contributes
#[derive(Clone, Copy, Default)]
pub struct CardRules {
    pub on_cast: Option<Resolver>,
    pub on_enter: Option<Resolver>,
    pub on_activate: Option<Resolver>,
    pub untapped_if: Option<UntappedIf>,
}

/// Card → rules table
#[derive(Clone, Default)]
pub struct RulesRegistry {
    rules: FxHashMap<Card, CardRules>,
}

impl RulesRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the Amulet Titan card pool
    pub fn standard() -> Self {
        let mut reg = RulesRegistry::new();

        for land in ["Forest", "Wastes", "Bojuka Bog"] {
            reg.on_enter(land, no_effect);
        }
        reg.on_enter("Castle Garenbrig", no_effect)
            .untapped_if("Castle Garenbrig", controls_forest)
            .on_activate("Castle Garenbrig", castle_garenbrig);
        reg.on_enter("Simic Growth Chamber", bounce_land);

        for permanent in [
            AMULET_OF_VIGOR,
            "Azusa, Lost but Seeking",
            "Sakura-Tribe Scout",
        ] {
            reg.on_cast(permanent, enter_battlefield);
        }
        reg.on_cast(PRIMEVAL_TITAN, primeval_titan)
            .on_cast("Summoner's Pact", summoners_pact)
            .on_cast("Explore", explore)
            .on_cast("Ancient Stirrings", ancient_stirrings)
            .on_cast("Adventurous Impulse", adventurous_impulse)
            .on_cast("Abundant Harvest", abundant_harvest)
            .on_cast("Arboreal Grazer", arboreal_grazer)
            .on_cast("Dryad of the Ilysian Grove", dryad_of_the_ilysian_grove)
            .on_cast("Elvish Spirit Guide", elvish_spirit_guide);

        reg
    }

    fn entry(&mut self, name: &str) -> &mut CardRules {
        self.rules.entry(Card::new(name)).or_default()
    }

    pub fn on_cast(&mut self, name: &str, resolver: Resolver) -> &mut Self {
        self.entry(name).on_cast = Some(resolver);
        self
    }

    pub fn on_enter(&mut self, name: &str, resolver: Resolver) -> &mut Self {
        self.entry(name).on_enter = Some(resolver);
        self
    }

    pub fn on_activate(&mut self, name: &str, resolver: Resolver) -> &mut Self {
        self.entry(name).on_activate = Some(resolver);
        self
    }

    pub fn untapped_if(&mut self, name: &str, condition: UntappedIf) -> &mut Self {
        self.entry(name).untapped_if = Some(condition);
        self
    }

    pub fn get(&self, card: &Card) -> Option<&CardRules> {
        self.rules.get(card)
    }

    pub fn cast_resolver(&self, card: &Card) -> Resolver {
        match self.get(card).and_then(|r| r.on_cast) {
            Some(resolver) => resolver,
            None => panic!("not sure how to cast: {card}"),
        }
    }

    pub fn enter_resolver(&self, card: &Card) -> Resolver {
        match self.get(card).and_then(|r| r.on_enter) {
            Some(resolver) => resolver,
            None => panic!("not sure how to play: {card}"),
        }
    }

    pub fn activate_resolver(&self, card: &Card) -> Resolver {
        match self.get(card).and_then(|r| r.on_activate) {
            Some(resolver) => resolver,
            None => panic!("not sure how to activate: {card}"),
        }
    }

    /// Whether `card` enters untapped despite normally entering tapped
    pub fn enters_untapped_anyway(&self, card: &Card, state: &GameState) -> bool {
        self.get(card)
            .and_then(|r| r.untapped_if)
            .is_some_and(|condition| condition(state))
    }

    /// Check that every card has the rules its type needs
    ///
    /// Lands need an enter rule, everything else a cast rule, and cards with
    /// an activation cost an activate rule.
    pub fn ensure_covers<'a>(
        &self,
        catalog: &CardCatalog,
        cards: impl IntoIterator<Item = &'a Card>,
    ) -> Result<()> {
        for card in cards {
            let data = catalog
                .get(card)
                .ok_or_else(|| SequencerError::UnknownCard(card.to_string()))?;
            let rules = self.get(card).copied().unwrap_or_default();
            let covered = if data.is_land() {
                rules.on_enter.is_some()
            } else {
                rules.on_cast.is_some()
            };
            if !covered || (data.has_ability() && rules.on_activate.is_none()) {
                return Err(SequencerError::MissingRules(card.to_string()));
            }
        }
        Ok(())
    }
}

fn controls_forest(state: &GameState) -> bool {
    state.battlefield.contains(&Card::new(FOREST))
}

fn no_effect(_t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    vec![state]
}

fn enter_battlefield(_t: &Transitions<'_>, mut state: GameState, card: &Card) -> Vec<GameState> {
    state.battlefield = state.battlefield.plus([card]);
    vec![state]
}

fn primeval_titan(_t: &Transitions<'_>, mut state: GameState, _card: &Card) -> Vec<GameState> {
    state.success = true;
    vec![state]
}

/// Return a land to hand. Without an Amulet, never pick the karoo itself
/// back up: replaying it only loses mana.
fn bounce_land(t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    let amulets = state.battlefield.count(&Card::new(AMULET_OF_VIGOR));
    let mut out = Vec::new();
    for land in state.battlefield.cards() {
        let data = t.catalog.data(land);
        if !data.is_land() || (amulets == 0 && data.bounce_land) {
            continue;
        }
        let mut branch = state.clone();
        branch.battlefield = branch.battlefield.minus([land]);
        branch.hand = branch.hand.plus([land]);
        branch.log.text(", bounce ");
        branch.log_card(land, t.catalog);
        out.push(branch);
    }
    out
}

/// Add six green and spend it on Titan straight away
fn castle_garenbrig(t: &Transitions<'_>, mut state: GameState, _card: &Card) -> Vec<GameState> {
    state.mana_pool = state.mana_pool.plus(CASTLE_BURST);
    t.cast(state, &Card::new(PRIMEVAL_TITAN))
}

/// Fetch any creature not already in hand, owing 2GG next turn. The
/// creature is cast immediately to avoid near-identical lines.
fn summoners_pact(t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    let mut seen: FxHashSet<&Card> = FxHashSet::default();
    let mut out = Vec::new();
    for card in state.library.iter() {
        if state.hand.contains(card) || !t.catalog.data(card).is_creature() || !seen.insert(card) {
            continue;
        }
        let mut branch = state.clone();
        branch.hand = branch.hand.plus([card]);
        branch.log.text(", grab ");
        branch.log_card(card, t.catalog);
        branch.mana_debt = branch.mana_debt.plus(PACT_DEBT);
        out.extend(t.cast(branch, card));
    }
    out
}

fn explore(t: &Transitions<'_>, mut state: GameState, _card: &Card) -> Vec<GameState> {
    state.land_plays += 1;
    vec![state.draw(1, t.catalog)]
}

fn ancient_stirrings(t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    look_and_take(t, state, 5, |c| t.catalog.data(c).colorless)
}

fn adventurous_impulse(t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    look_and_take(t, state, 3, |c| {
        let data = t.catalog.data(c);
        data.is_land() || data.is_creature()
    })
}

/// Look at the top `n`, take one qualifying card or none. One branch per
/// distinct qualifying card; the rest go to the graveyard either way.
fn look_and_take(
    t: &Transitions<'_>,
    mut state: GameState,
    n: usize,
    qualifies: impl Fn(&Card) -> bool,
) -> Vec<GameState> {
    let n = n.min(state.library.len());
    let (looked, library) = state.library.split_after(n);
    state.library = library;
    let looked: CardMultiset = looked.into_iter().collect();
    state.log.text(", mill ");
    state.log_cards(&looked, t.catalog);

    let mut out = Vec::new();
    for card in looked.cards() {
        if !qualifies(card) {
            continue;
        }
        let mut branch = state.clone();
        branch.log.text(", grab ");
        branch.log_card(card, t.catalog);
        branch.hand = branch.hand.plus([card]);
        out.push(branch);
    }
    if out.is_empty() {
        state.log.text(", whiff");
        out.push(state);
    }
    out
}

/// Choose land or nonland, then reveal until a card of that kind turns up
fn abundant_harvest(t: &Transitions<'_>, state: GameState, _card: &Card) -> Vec<GameState> {
    let mut out = Vec::with_capacity(2);
    for choose_land in [true, false] {
        let mut branch = state.clone();
        branch.log.text(if choose_land { ", choose land" } else { ", choose nonland" });

        let hit = state
            .library
            .position(|c| t.catalog.data(c).is_land() == choose_land);
        let revealed_count = hit.map_or(state.library.len(), |i| i + 1);
        let (revealed, library) = state.library.split_after(revealed_count);
        branch.library = library;

        branch.log.text(", reveal");
        for card in &revealed {
            branch.log.text(" ");
            branch.log_card(card, t.catalog);
        }
        match hit.and_then(|i| revealed.get(i)) {
            Some(keep) => {
                branch.log.text(", grab ");
                branch.log_card(keep, t.catalog);
                branch.hand = branch.hand.plus([keep]);
            }
            None => branch.log.text(", whiff"),
        }
        out.push(branch);
    }
    out
}

/// Put a land from hand onto the battlefield tapped
fn arboreal_grazer(t: &Transitions<'_>, mut state: GameState, card: &Card) -> Vec<GameState> {
    state.battlefield = state.battlefield.plus([card]);
    let lands: Vec<Card> = state
        .hand
        .cards()
        .filter(|c| t.catalog.data(c).is_land())
        .cloned()
        .collect();

    let mut out = Vec::new();
    for land in &lands {
        let mut branch = state.clone();
        branch.log.text(", play ");
        branch.log_card(land, t.catalog);
        out.extend(t.enter_tapped(branch, land));
    }
    out
}

fn dryad_of_the_ilysian_grove(t: &Transitions<'_>, state: GameState, card: &Card) -> Vec<GameState> {
    enter_battlefield(t, state, card)
        .into_iter()
        .map(|mut s| {
            s.land_plays += 1;
            s
        })
        .collect()
}

/// Exile from hand for G. Not available before the first turn starts.
fn elvish_spirit_guide(_t: &Transitions<'_>, mut state: GameState, _card: &Card) -> Vec<GameState> {
    if state.turn == 0 {
        return Vec::new();
    }
    state.mana_pool = state.mana_pool.plus(Mana::green(1));
    vec![state]
}
