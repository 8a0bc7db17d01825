//! Words on each screen.

pub fn welcome_title(name: &str) -> String {
    format!("Hello {}!", name)
}

pub const WELCOME_BODY: &str =
    "I heard it's a very special day. Can you catch the Start Surprises button to begin?";

pub fn roast_setup(name: &str) -> String {
    format!(
        "Did you know, {}, that a hummingbird weighs less than a nickel and still flies across the Gulf of Mexico?",
        name
    )
}

pub const ROAST_PUNCHLINE: &str =
    "Small and mighty. Sound like anyone who needs a step stool for the top shelf?";

pub const FACT_SETUP: &str = "You can fit all the other planets in our solar system in the space \
    between the Earth and the Moon, with room to spare.";

pub const FACT_PUNCHLINE: &str = "My heart still has more space for you.";

pub fn reasons_title(age: u32) -> String {
    format!("{} Reasons to Celebrate You", age)
}

pub const SHAYARI: [&str; 4] = [
    "तोहार 'मुस्कान' रहे सदा अइसहीं,",
    "खुशियन से भरल रहे जहान तोहार।",
    "जनमदिन के ढेर सारी बधाई,",
    "खुश रहऽ तू हरदम अइसहीं!",
];

pub fn celebration_title(name: &str) -> String {
    format!("Happy Birthday, {}!", name)
}

pub fn celebration_body(age: u32) -> String {
    format!(
        "May your {} year be as vibrant and joyful as your smile.",
        ordinal(age)
    )
}

pub fn impact_title(name: &str) -> String {
    format!("To {}, who lives up to the smile...", name)
}

pub fn impact_body(name: &str) -> Vec<String> {
    vec![
        format!(
            "{}, beyond all the jokes and the roasts, I wanted to say something real. \
             Knowing you has been one of the best things to happen to me.",
            name
        ),
        "Your kindness and your spirit light up even the grey days. \
         You teach resilience and joy just by being exactly who you are."
            .to_string(),
    ]
}

pub const IMPACT_CLOSING: &str =
    "Thank you for the difference you make in my life. It's bigger than any galaxy we could talk about.";

pub fn impact_footer(age: u32) -> String {
    format!("Happy {} Birthday", ordinal(age))
}

/// `1st`, `2nd`, `3rd`, `4th`, ... `11th`, `12th`, `13th`, `21st`.
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}
