//! Pinboard entry point
//!
//! Mounts the shape and kanban boards into the page and wires DOM events to
//! store operations.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, MouseEvent};

    use pinboard::actions::{self, KanbanAction};
    use pinboard::kanban::{Board, Card, CardField, Column, KanbanStore};
    use pinboard::palette::{ColorGenerator, IdGenerator};
    use pinboard::persistence::Storage;
    use pinboard::platform;
    use pinboard::shapes::{ShapeKind, ShapeStore, State};
    use pinboard::settings::Settings;
    use pinboard::view::{BoardPatch, BoardView, Patch, ShapeView, TextChange};

    type Shared<T> = Rc<RefCell<T>>;
    type Shapes = ShapeStore<Box<dyn Storage>>;
    type Kanban = KanbanStore<Box<dyn Storage>>;

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    fn set_background(el: &Element, color: &str) {
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("background-color", color);
        }
    }

    /// Element that fired `event`
    fn event_element(event: &Event) -> Option<Element> {
        event.target()?.dyn_into::<Element>().ok()
    }

    fn on_click(document: &Document, id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document.get_element_by_id(id) else {
            log::warn!("Missing #{}, button not wired", id);
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // ------------------------------------------------------------------
    // Shape board
    // ------------------------------------------------------------------

    struct ShapeRenderer {
        board: Element,
        square_count: Option<Element>,
        circle_count: Option<Element>,
        view: ShapeView,
        elements: HashMap<String, Element>,
    }

    impl ShapeRenderer {
        fn render(&mut self, state: &State) {
            let document = document();
            for patch in self.view.reconcile(state) {
                match patch {
                    Patch::Create { id, kind, color } => {
                        let el = match document.create_element("div") {
                            Ok(el) => el,
                            Err(e) => {
                                log::error!("Failed to create shape element: {:?}", e);
                                self.view.unmount(&id);
                                continue;
                            }
                        };
                        el.set_class_name(&format!("shape {}", kind));
                        let _ = el.set_attribute("data-id", &id);
                        set_background(&el, &color);
                        let _ = self.board.append_child(&el);
                        self.elements.insert(id, el);
                    }
                    Patch::Recolor { id, color } => {
                        if let Some(el) = self.elements.get(&id) {
                            set_background(el, &color);
                        }
                    }
                    Patch::Remove { id } => {
                        if let Some(el) = self.elements.remove(&id) {
                            el.remove();
                        }
                    }
                }
            }
            self.update_counters(state);
        }

        fn update_counters(&self, state: &State) {
            let counters = [
                (&self.square_count, ShapeKind::Square),
                (&self.circle_count, ShapeKind::Circle),
            ];
            for (el, kind) in counters {
                if let Some(el) = el {
                    el.set_text_content(Some(&state.count_by_type(kind.as_str()).to_string()));
                }
            }
        }
    }

    fn mount_shapes(document: &Document, settings: &Settings, seed: u64) {
        let Some(board) = document.get_element_by_id("board") else {
            return;
        };

        let store: Shared<Shapes> = Rc::new(RefCell::new(ShapeStore::open(platform::open_storage())));
        let colors = Rc::new(RefCell::new(ColorGenerator::new(seed, settings.shape_colors)));
        let ids = Rc::new(RefCell::new(IdGenerator::new(seed.rotate_left(17), "shape")));

        let renderer = Rc::new(RefCell::new(ShapeRenderer {
            board: board.clone(),
            square_count: document.get_element_by_id("cntSquares"),
            circle_count: document.get_element_by_id("cntCircles"),
            view: ShapeView::new(),
            elements: HashMap::new(),
        }));
        renderer.borrow_mut().render(store.borrow().state());
        {
            let renderer = renderer.clone();
            store
                .borrow_mut()
                .subscribe(move |state: &State| renderer.borrow_mut().render(state));
        }

        for kind in ShapeKind::ALL {
            let (add_button, recolor_button) = match kind {
                ShapeKind::Square => ("addSquare", "recolorSquares"),
                ShapeKind::Circle => ("addCircle", "recolorCircles"),
            };

            {
                let store = store.clone();
                let colors = colors.clone();
                let ids = ids.clone();
                on_click(document, add_button, move || {
                    let color = colors.borrow_mut().next_color();
                    let mut store = store.borrow_mut();
                    let id = ids.borrow_mut().fresh_id(|id| store.state().contains(id));
                    store.add_record(kind.as_str(), color, id);
                });
            }

            {
                let store = store.clone();
                let colors = colors.clone();
                on_click(document, recolor_button, move || {
                    let mut colors = colors.borrow_mut();
                    store
                        .borrow_mut()
                        .recolor_by_type(kind.as_str(), |shape| colors.next_color_unlike(&shape.color));
                });
            }
        }

        // Click a shape: play the remove animation, then drop it from the store
        let delay = settings.remove_delay_ms.min(i32::MAX as u32) as i32;
        let key = store.borrow().key().to_string();
        let board_el = board.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(shape) = event_element(&event).and_then(|el| el.closest(".shape").ok().flatten())
            else {
                return;
            };
            let node: &web_sys::Node = &shape;
            if !board_el.contains(Some(node)) {
                return;
            }
            let Some(id) = shape.get_attribute("data-id") else {
                return;
            };
            let _ = shape.class_list().add_1("removing");

            let store = store.clone();
            let remove = Closure::once_into_js(move || {
                store.borrow_mut().remove_record(&id);
            });
            if let Some(window) = web_sys::window() {
                let _ = window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(remove.unchecked_ref(), delay);
            }
        });
        let _ = board.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();

        log::info!("Shape board mounted ({})", key);
    }

    // ------------------------------------------------------------------
    // Kanban board
    // ------------------------------------------------------------------

    fn field_of(el: &Element) -> Option<CardField> {
        CardField::from_str(&el.get_attribute("data-field")?)
    }

    fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
        let el = document.create_element(tag)?;
        el.set_class_name(class);
        Ok(el)
    }

    fn button(
        document: &Document,
        class: &str,
        label: &str,
        attrs: &[(&str, &str)],
    ) -> Result<Element, JsValue> {
        let el = element(document, "button", class)?;
        el.set_text_content(Some(label));
        for (name, value) in attrs {
            el.set_attribute(name, value)?;
        }
        Ok(el)
    }

    fn editable(document: &Document, card: &Card, field: CardField) -> Result<Element, JsValue> {
        let el = element(document, "div", field.css_class())?;
        el.set_attribute("contenteditable", "true")?;
        el.set_attribute("data-id", &card.id)?;
        el.set_attribute("data-field", field.as_str())?;
        let text = match card.text(field) {
            "" => field.default_text(),
            text => text,
        };
        el.set_text_content(Some(text));
        Ok(el)
    }

    fn build_card(document: &Document, column: Column, card: &Card) -> Result<Element, JsValue> {
        let color = card.color.as_str();
        let el = element(document, "div", "card")?;
        el.set_attribute("data-id", &card.id)?;
        set_background(&el, color);
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            html.style().set_property("border-left-color", color)?;
        }

        let delete = button(
            document,
            "delete-card",
            "✖",
            &[("data-action", actions::DELETE), ("data-id", &card.id)],
        )?;
        el.append_child(&delete)?;
        for field in CardField::ALL {
            let text = editable(document, card, field)?;
            el.append_child(&text)?;
        }

        let actions = element(document, "div", "card-actions")?;
        let picker = element(document, "input", "color-picker")?;
        picker.set_attribute("type", "color")?;
        picker.set_attribute("data-id", &card.id)?;
        picker.set_attribute("value", color)?;
        actions.append_child(&picker)?;

        let moves = element(document, "div", "move-buttons")?;
        let left = button(
            document,
            "move-btn move-left",
            "←",
            &[("data-action", actions::MOVE_LEFT), ("data-id", &card.id)],
        )?;
        let right = button(
            document,
            "move-btn move-right",
            "→",
            &[("data-action", actions::MOVE_RIGHT), ("data-id", &card.id)],
        )?;
        if column.is_first() {
            left.set_attribute("style", "display: none;")?;
        }
        if column.is_last() {
            right.set_attribute("style", "display: none;")?;
        }
        moves.append_child(&left)?;
        moves.append_child(&right)?;
        actions.append_child(&moves)?;
        el.append_child(&actions)?;

        Ok(el)
    }

    fn build_column(document: &Document, column: Column, cards: &[Card]) -> Result<Element, JsValue> {
        let col = element(document, "div", "column")?;
        col.set_id(column.id());

        let heading = document.create_element("h2")?;
        heading.set_text_content(Some(column.title()));
        col.append_child(&heading)?;

        let options = element(document, "div", "column-options")?;
        let count = element(document, "span", "card-count")?;
        count.set_text_content(Some(&format!("Cards: {}", cards.len())));
        options.append_child(&count)?;
        for (class, label, action) in [
            ("add-card-btn", "+ Add card", actions::ADD),
            ("color-column-btn", "Color column", actions::COLOR_COLUMN),
            ("sort-btn", "↕ Sort", actions::SORT),
        ] {
            let btn = button(
                document,
                class,
                label,
                &[("data-action", action), ("data-column-id", column.id())],
            )?;
            options.append_child(&btn)?;
        }
        col.append_child(&options)?;

        let container = element(document, "div", "cards-container")?;
        for card in cards {
            let card_el = build_card(document, column, card)?;
            container.append_child(&card_el)?;
        }
        col.append_child(&container)?;

        Ok(col)
    }

    struct KanbanRenderer {
        root: Element,
        view: BoardView,
    }

    impl KanbanRenderer {
        fn render(&mut self, board: &Board) {
            match self.view.reconcile(board) {
                BoardPatch::Nothing => {}
                BoardPatch::Rebuild => self.rebuild(board),
                BoardPatch::Retext(changes) => self.retext(&changes),
            }
        }

        fn rebuild(&self, board: &Board) {
            let document = document();
            self.root.set_inner_html("");
            for column in Column::ALL {
                match build_column(&document, column, board.column(column)) {
                    Ok(col) => {
                        let _ = self.root.append_child(&col);
                    }
                    Err(e) => log::error!("Failed to render column {}: {:?}", column.id(), e),
                }
            }
        }

        /// Update card text in place, leaving the field being typed in alone
        fn retext(&self, changes: &[TextChange]) {
            let focused = document().active_element();
            for change in changes {
                let selector = format!(".{}[data-id=\"{}\"]", change.field.css_class(), change.id);
                if let Ok(Some(el)) = self.root.query_selector(&selector) {
                    if focused.as_ref() != Some(&el) {
                        el.set_text_content(Some(&change.text));
                    }
                }
            }
        }
    }

    fn handle_kanban_click(
        target: &Element,
        store: &Shared<Kanban>,
        colors: &Shared<ColorGenerator>,
        ids: &Shared<IdGenerator>,
        confirm_delete: bool,
    ) {
        let Some(action) = target.get_attribute("data-action") else {
            return;
        };
        let column_id = target.get_attribute("data-column-id");
        let card_id = target.get_attribute("data-id");
        let Some(parsed) = KanbanAction::parse(&action, column_id.as_deref(), card_id.as_deref()) else {
            log::debug!("Ignoring kanban action `{}`", action);
            return;
        };

        let commit = parsed.apply(
            &mut store.borrow_mut(),
            &mut colors.borrow_mut(),
            &mut ids.borrow_mut(),
            || {
                !confirm_delete
                    || web_sys::window()
                        .and_then(|w| w.confirm_with_message("Delete this card?").ok())
                        .unwrap_or(false)
            },
        );
        if let Some(err) = commit.error() {
            log::warn!("`{}` applied but not saved: {}", action, err);
        }
    }

    fn listen(root: &Element, event: &str, mut handler: impl FnMut(Element) + 'static) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            if let Some(el) = event_element(&event) {
                handler(el);
            }
        });
        let _ = root.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn mount_kanban(document: &Document, settings: &Settings, seed: u64) {
        let Some(root) = document.get_element_by_id("kanban-board") else {
            return;
        };

        let store: Shared<Kanban> = Rc::new(RefCell::new(KanbanStore::open(platform::open_storage())));
        let colors = Rc::new(RefCell::new(ColorGenerator::new(seed, settings.card_colors)));
        let ids = Rc::new(RefCell::new(IdGenerator::new(seed.rotate_left(29), "card")));

        // Cards saved without a color get one now, so the board matches storage
        {
            let mut colors = colors.borrow_mut();
            store.borrow_mut().assign_missing_colors(|| colors.next_color());
        }
        let key = store.borrow().key().to_string();

        let renderer = Rc::new(RefCell::new(KanbanRenderer {
            root: root.clone(),
            view: BoardView::new(),
        }));
        renderer.borrow_mut().render(store.borrow().state());
        {
            let renderer = renderer.clone();
            store
                .borrow_mut()
                .subscribe(move |board: &Board| renderer.borrow_mut().render(board));
        }

        // Buttons (delegated, so rebuilt columns need no rewiring)
        {
            let store = store.clone();
            let confirm_delete = settings.confirm_delete;
            listen(&root, "click", move |el| {
                if let Ok(Some(target)) = el.closest("[data-action]") {
                    handle_kanban_click(&target, &store, &colors, &ids, confirm_delete);
                }
            });
        }

        // Clear placeholder text when an editable field gains focus
        listen(&root, "focusin", |el| {
            if let Some(field) = field_of(&el) {
                let text = el.text_content().unwrap_or_default();
                if text.trim() == field.default_text() {
                    el.set_text_content(Some(""));
                }
            }
        });

        // Commit text edits on blur
        {
            let store = store.clone();
            listen(&root, "focusout", move |el| {
                let (Some(field), Some(id)) = (field_of(&el), el.get_attribute("data-id")) else {
                    return;
                };
                let text = el.text_content().unwrap_or_default();
                let mut store = store.borrow_mut();
                store.edit_card(&id, field, &text);
                if let Some(card) = store.state().card(&id) {
                    el.set_text_content(Some(card.text(field)));
                }
            });
        }

        // Color picker: commit once the picker closes
        listen(&root, "change", move |el| {
            let Some(input) = el.dyn_ref::<HtmlInputElement>() else {
                return;
            };
            if let Some(id) = input.get_attribute("data-id") {
                store.borrow_mut().set_card_color(&id, &input.value());
            }
        });

        log::info!("Kanban board mounted ({})", key);
    }

    pub fn run() {
        // Pick the log level first so the settings outcome is actually logged
        let outcome = Settings::try_load(&*platform::open_storage());
        let level = outcome
            .as_ref()
            .map(Settings::level_filter)
            .unwrap_or(log::LevelFilter::Info);
        platform::init_logging(level);
        log::info!("Pinboard starting...");
        let settings = Settings::from_outcome(outcome);

        let document = document();
        let seed = platform::entropy_seed();
        log::debug!("Generators seeded with {}", seed);

        mount_shapes(&document, &settings, seed);
        mount_kanban(&document, &settings, seed ^ 0x9e37_79b9_7f4a_7c15);

        log::info!("Pinboard running!");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    let settings = pinboard::Settings::default();
    pinboard::platform::init_logging(settings.level_filter());
    log::info!("Pinboard (native) starting...");
    log::info!("The boards render in the browser - run with `trunk serve` for the web version");

    println!("\nRunning store smoke test...");
    smoke_test();
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_test() {
    use pinboard::kanban::{Column, Direction, KanbanStore};
    use pinboard::palette::{ColorGenerator, ColorScheme, IdGenerator};
    use pinboard::platform::MemoryStorage;
    use pinboard::shapes::{ShapeKind, ShapeStore, State};

    let seed = pinboard::platform::entropy_seed();
    let mut colors = ColorGenerator::new(seed, ColorScheme::Vivid);
    let mut ids = IdGenerator::new(seed, "shape");

    let mut shapes = ShapeStore::open(MemoryStorage::new());
    shapes.subscribe(|state: &State| log::info!("{} shapes on the board", state.shapes.len()));
    for kind in ShapeKind::ALL {
        shapes.add_record(kind.as_str(), colors.next_color(), ids.next_id());
    }
    shapes.recolor_by_type(ShapeKind::Square.as_str(), |shape| colors.next_color_unlike(&shape.color));
    let first = shapes.state().shapes[0].id.clone();
    shapes.remove_record(&first);
    assert_eq!(shapes.count_by_type(ShapeKind::Square.as_str()), 0);
    assert_eq!(shapes.count_by_type(ShapeKind::Circle.as_str()), 1);

    let mut cards = IdGenerator::new(seed, "card");
    let mut kanban = KanbanStore::open(MemoryStorage::new());
    let id = cards.next_id();
    kanban.add_card(Column::Todo, id.as_str(), "#e1f5fe");
    kanban.move_card(&id, Direction::Right);
    assert_eq!(kanban.card_count(Column::InProgress), 1);

    println!("✓ Store smoke test passed!");
    match serde_json::to_string_pretty(shapes.state()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to encode state: {}", e),
    }
}
