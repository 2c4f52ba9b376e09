use yew::prelude::*;

use super::app::AppContext;
use crate::store::BalanceUpdate;
use crate::util::format_points;

pub fn balance_label(identity_known: bool, balance: Option<u64>) -> String {
    match (identity_known, balance) {
        (false, _) => "Connecting...".to_string(),
        (true, None) => "Loading...".to_string(),
        (true, Some(b)) => format!("{} $BWAVE", format_points(b)),
    }
}

#[function_component]
pub fn BalanceDisplay() -> Html {
    let ctx = use_context::<AppContext>();
    let store = ctx.as_ref().map(|c| c.balance.clone());
    let identity_known = ctx.as_ref().is_some_and(|c| c.identity.is_some());
    let balance = use_state(|| store.as_ref().and_then(|s| s.get()));
    {
        let balance = balance.clone();
        use_effect_with(store, move |store| {
            let sub = store.as_ref().map(|store| {
                // The store may have been written between render and subscribe.
                balance.set(store.get());
                store.subscribe(Callback::from(move |u: BalanceUpdate| balance.set(Some(u.balance))))
            });
            move || drop(sub)
        });
    }
    let text = balance_label(identity_known, *balance);
    html! {<div style="position:fixed; top:14px; left:50%; transform:translateX(-50%); z-index:30; padding:6px 16px; background:rgba(0,0,0,0.55); border:1px solid #164e63; border-radius:999px; color:#22d3ee; font-weight:600; font-variant-numeric:tabular-nums; font-size:15px;">
        { text }
    </div>}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_text_per_state() {
        assert_eq!(balance_label(false, Some(5)), "Connecting...");
        assert_eq!(balance_label(true, None), "Loading...");
        assert_eq!(balance_label(true, Some(12_500)), "12,500 $BWAVE");
    }
}
