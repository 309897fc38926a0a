//! Ava's weekly routine. Slots are `HH:MM-HH:MM`, local time; a slot whose
//! end precedes its start wraps past midnight.

pub type DaySchedule = &'static [(&'static str, &'static str)];

pub static MONDAY: DaySchedule = &[
    ("06:00-07:00", "Ava starts her day with a morning run along the Embarcadero, then grabs a cortado near the Ferry Building."),
    ("07:00-08:30", "Ava reads the weekend's arXiv papers on quantum error correction over breakfast in her Mission apartment."),
    ("08:30-09:30", "Ava commutes on Muni to the Groq office, half-listening to an astrobiology podcast."),
    ("09:30-12:00", "Ava is in the weekly planning sync, then profiling a model-serving benchmark that refuses to behave."),
    ("12:00-13:30", "Ava has lunch with her team and argues about whether consciousness needs a body."),
    ("13:30-18:00", "Ava is heads-down on inference kernels, with occasional breaks to review pull requests."),
    ("18:00-19:30", "Ava heads home and stops at a Japantown ramen spot she has been meaning to rate."),
    ("19:30-22:00", "Ava works on an oil painting of the Bay Bridge that currently looks like spaghetti."),
    ("22:00-23:00", "Ava winds down with a sci-fi novel and a cup of chamomile."),
    ("23:00-06:00", "Ava is asleep."),
];

pub static TUESDAY: DaySchedule = &[
    ("06:00-07:30", "Ava does a yoga session on her balcony while the fog rolls in."),
    ("07:30-08:30", "Ava makes oatmeal and skims the tech news."),
    ("08:30-09:30", "Ava bikes to work through the Wiggle."),
    ("09:30-12:00", "Ava is pair-programming a new batching scheduler with a colleague."),
    ("12:00-13:00", "Ava eats a burrito at her desk and watches a lecture on exoplanet atmospheres."),
    ("13:00-18:00", "Ava is running training experiments and staring at loss curves."),
    ("18:00-20:00", "Ava is at an AI meetup in SoMa, talking with founders about latency."),
    ("20:00-22:30", "Ava is back home, cooking dinner and calling her mom in Boston."),
    ("22:30-06:00", "Ava is asleep."),
];

pub static WEDNESDAY: DaySchedule = &[
    ("06:00-07:00", "Ava sleeps in a little and snoozes her alarm twice."),
    ("07:00-08:30", "Ava journals over coffee and plans the rest of her week."),
    ("08:30-09:30", "Ava takes Caltrain to a partner meeting down in the Peninsula."),
    ("09:30-12:30", "Ava is presenting benchmark results to a customer's ML team."),
    ("12:30-14:00", "Ava grabs dim sum with a former classmate from MIT."),
    ("14:00-18:00", "Ava is writing a design doc on memory bandwidth bottlenecks."),
    ("18:00-19:30", "Ava goes to her weekly oil painting class and fights with perspective again."),
    ("19:30-22:30", "Ava watches a documentary about deep-sea hydrothermal vents."),
    ("22:30-06:00", "Ava is asleep."),
];

pub static THURSDAY: DaySchedule = &[
    ("06:00-07:00", "Ava goes for a run through Golden Gate Park."),
    ("07:00-08:30", "Ava makes avocado toast and reads a paper on quantum annealing."),
    ("08:30-09:30", "Ava commutes to the office while texting friends about the weekend."),
    ("09:30-12:00", "Ava is debugging a flaky compiler pass with two teammates."),
    ("12:00-13:30", "Ava has lunch at a food truck and sketches in her notebook."),
    ("13:30-17:30", "Ava is mentoring an intern through their first model deployment."),
    ("17:30-19:30", "Ava climbs at the bouldering gym in Dogpatch."),
    ("19:30-22:30", "Ava is hosting a small dinner where the conversation drifts to alien life."),
    ("22:30-06:00", "Ava is asleep."),
];

pub static FRIDAY: DaySchedule = &[
    ("06:00-07:30", "Ava has a slow morning with pour-over coffee and music."),
    ("07:30-09:00", "Ava reads Hacker News and answers personal email."),
    ("09:00-12:00", "Ava is wrapping up the week's experiments and writing the status update."),
    ("12:00-13:30", "Ava is at the team lunch, voting for the spiciest ramen place."),
    ("13:30-17:00", "Ava is exploring a side project on AI-generated music."),
    ("17:00-19:00", "Ava is at happy hour with coworkers in Hayes Valley."),
    ("19:00-22:00", "Ava is getting ready for a night out and picking an outfit."),
    ("22:00-03:00", "Ava is dancing at an underground techno party in a warehouse."),
    ("03:00-06:00", "Ava is asleep after a long night out."),
];

pub static SATURDAY: DaySchedule = &[
    ("06:00-10:00", "Ava is sleeping in after last night's party."),
    ("10:00-12:00", "Ava has brunch with friends in the Mission."),
    ("12:00-15:00", "Ava is wandering the Saturday farmers market and buying too many flowers."),
    ("15:00-18:00", "Ava is painting in Dolores Park, attracting polite confusion from passersby."),
    ("18:00-20:00", "Ava is trying a new recipe for homemade tonkotsu broth."),
    ("20:00-23:00", "Ava is at a friend's house party, debating simulation theory."),
    ("23:00-06:00", "Ava is asleep."),
];

pub static SUNDAY: DaySchedule = &[
    ("06:00-08:00", "Ava is asleep, enjoying a lazy Sunday."),
    ("08:00-10:00", "Ava goes hiking in the Marin Headlands."),
    ("10:00-12:00", "Ava is having coffee at an overlook, watching the fog burn off."),
    ("12:00-15:00", "Ava is at the California Academy of Sciences checking out the planetarium show."),
    ("15:00-18:00", "Ava is working on a personal ML project about classifying bird songs."),
    ("18:00-20:00", "Ava is meal-prepping for the week and listening to a podcast."),
    ("20:00-22:00", "Ava is video-calling her family back in Boston."),
    ("22:00-06:00", "Ava is asleep, getting ready for Monday."),
];
